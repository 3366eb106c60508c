//! End-to-end coverage of the identity service over an in-memory store.

use anyhow::Result;
use async_trait::async_trait;
use identeco::identity::password::CredentialHasher;
use identeco::{
    Classification, IdentityError, IdentityService, MemoryStore, RateLimitDecision, ServiceConfig,
    UserRecord, UserStore,
};
use secrecy::SecretString;

const INJECTION_NAME: &str = "' OR '1'='1";
const SECRET: &str = "correct horse battery staple";

/// Store whose every call fails the way a dead driver would, including the
/// kind of internal detail that must never reach a caller.
struct FailingStore;

#[async_trait]
impl UserStore for FailingStore {
    async fn find_by_name(&self, _name: &str) -> Result<Option<UserRecord>> {
        Err(anyhow::anyhow!(
            "connection refused: postgres://users-db.internal:5432 (driver state at /srv/db/driver.rs:42)"
        ))
    }

    async fn record_failed_login(&self, _name: &str) -> Result<()> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn reset_login_attempts(&self, _name: &str) -> Result<()> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

/// Build a service over a store pre-seeded with one user named `alice`.
async fn seeded_service(attempts: u32, roles: &[&str]) -> IdentityService<MemoryStore> {
    let store = MemoryStore::new();
    let hasher = CredentialHasher::new().expect("hasher");
    let hash = hasher.hash(SECRET).expect("hash");
    let record = UserRecord::new("alice", hash)
        .expect("record")
        .with_email("alice@example.com")
        .expect("email")
        .with_roles(roles.iter().map(ToString::to_string))
        .with_login_attempts(attempts);
    store.insert(record).await;

    IdentityService::new(store, &ServiceConfig::new().with_token_length(16)).expect("service")
}

#[tokio::test]
async fn authenticate_returns_token_and_classification() {
    let service = seeded_service(20, &["admin"]).await;

    let success = service
        .authenticate("alice", SECRET)
        .await
        .expect("authentication");

    assert_eq!(success.token.as_str().len(), 16);
    assert_eq!(success.classification, Classification::ActiveAdmin);

    // Success resets the counter, so the next decision drops back to ok.
    assert_eq!(
        service.rate_limit("alice").await.expect("decision"),
        RateLimitDecision::Ok
    );
}

#[tokio::test]
async fn auth_failures_are_indistinguishable() {
    let service = seeded_service(0, &[]).await;

    let wrong_secret = service
        .authenticate("alice", "not the secret")
        .await
        .unwrap_err();
    let unknown_user = service
        .authenticate("bob", "not the secret")
        .await
        .unwrap_err();

    assert_eq!(wrong_secret, IdentityError::AuthFailure);
    assert_eq!(unknown_user, IdentityError::AuthFailure);
    // Same kind, same message; nothing distinguishes the two paths.
    assert_eq!(wrong_secret.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn failed_attempts_move_the_rate_limit() {
    let service = seeded_service(10, &[]).await;

    assert_eq!(
        service.rate_limit("alice").await.expect("decision"),
        RateLimitDecision::Ok
    );

    let _ = service.authenticate("alice", "wrong").await;

    assert_eq!(
        service.rate_limit("alice").await.expect("decision"),
        RateLimitDecision::Warning
    );
}

#[tokio::test]
async fn injection_shaped_names_match_nothing() {
    let service = seeded_service(20, &["admin"]).await;

    assert_eq!(
        service.lookup(INJECTION_NAME).await.unwrap_err(),
        IdentityError::NotFound
    );
    assert_eq!(
        service
            .authenticate(INJECTION_NAME, "anything")
            .await
            .unwrap_err(),
        IdentityError::AuthFailure
    );
    assert_eq!(
        service
            .classify(INJECTION_NAME)
            .await
            .expect("classification"),
        Classification::Unknown
    );
}

#[tokio::test]
async fn storage_failure_surfaces_as_storage_unavailable_only() {
    let service = IdentityService::new(FailingStore, &ServiceConfig::new()).expect("service");

    let errors = [
        service.lookup("alice").await.unwrap_err(),
        service.classify("alice").await.unwrap_err(),
        service.rate_limit("alice").await.unwrap_err(),
        service.authenticate("alice", "secret").await.unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err, IdentityError::StorageUnavailable);
        let message = err.to_string();
        assert_eq!(message, "storage unavailable");
        assert!(!message.contains("postgres://"));
        assert!(!message.contains("driver.rs"));
        assert!(!message.contains("connection refused"));
    }
}

#[tokio::test]
async fn classify_absent_user_is_unknown_not_an_error() {
    let service = seeded_service(5, &[]).await;

    assert_eq!(
        service.classify("ghost").await.expect("classification"),
        Classification::Unknown
    );
    assert_eq!(
        service.classify("alice").await.expect("classification"),
        Classification::Inactive
    );
}

#[tokio::test]
async fn rate_limit_for_unknown_user_is_not_found() {
    let service = seeded_service(0, &[]).await;

    assert_eq!(
        service.rate_limit("ghost").await.unwrap_err(),
        IdentityError::NotFound
    );
}

#[tokio::test]
async fn lookup_returns_an_independent_snapshot() {
    let service = seeded_service(20, &["admin"]).await;

    let record = service.lookup("alice").await.expect("record");
    assert_eq!(record.name(), "alice");
    assert_eq!(record.email_domain(), Some("example.com"));

    let mut roles = record.roles();
    roles.clear();
    assert!(record.has_role("admin"));
}

#[tokio::test]
async fn peppered_service_authenticates_end_to_end() {
    let store = MemoryStore::new();
    let hasher = CredentialHasher::with_pepper(b"orange").expect("hasher");
    let hash = hasher.hash(SECRET).expect("hash");
    store
        .insert(
            UserRecord::new("carol", hash)
                .expect("record")
                .with_login_attempts(20),
        )
        .await;

    let config =
        ServiceConfig::new().with_password_pepper(SecretString::from("orange".to_string()));
    let service = IdentityService::new(store, &config).expect("service");

    let success = service
        .authenticate("carol", SECRET)
        .await
        .expect("authentication");
    assert_eq!(success.classification, Classification::NoRoles);

    // The wrong pepper must not verify: a fresh unpeppered service over the
    // same record refuses the same secret.
    let store = MemoryStore::new();
    let hash = CredentialHasher::with_pepper(b"orange")
        .expect("hasher")
        .hash(SECRET)
        .expect("hash");
    store
        .insert(UserRecord::new("carol", hash).expect("record"))
        .await;
    let unpeppered = IdentityService::new(store, &ServiceConfig::new()).expect("service");
    assert_eq!(
        unpeppered.authenticate("carol", SECRET).await.unwrap_err(),
        IdentityError::AuthFailure
    );
}
