//! Identity service: the orchestrator callers talk to.

use crate::config::ServiceConfig;
use crate::error::IdentityError;
use crate::store::{UserRecord, UserStore};
use tracing::{error, instrument};

pub mod classifier;
pub mod password;
pub mod rate_limit;
pub mod token;

use classifier::Classification;
use password::CredentialHasher;
use rate_limit::RateLimitDecision;
use token::{Token, TokenGenerator};

/// Fixed secret hashed once at startup. Unknown-user authentications verify
/// against it so both failure paths do comparable work.
const FALLBACK_SECRET: &str = "identeco-fallback-credential";

/// Result of a successful authentication.
#[derive(Debug)]
pub struct AuthSuccess {
    pub token: Token,
    pub classification: Classification,
}

/// Orchestrates lookups, credential checks, classification, and throttling
/// over a [`UserStore`].
///
/// Every operation reports failures from the closed [`IdentityError`] set;
/// anything the store or the crypto layer raises is logged here and mapped,
/// never forwarded.
pub struct IdentityService<S> {
    store: S,
    hasher: CredentialHasher,
    tokens: TokenGenerator,
    token_length: usize,
    fallback_hash: String,
}

impl<S: UserStore> IdentityService<S> {
    /// Build a service over `store`.
    ///
    /// Fails with [`IdentityError::HashingUnavailable`] when the hashing
    /// primitive cannot be initialized; hosts should treat that as a startup
    /// error, not retry it per request.
    pub fn new(store: S, config: &ServiceConfig) -> Result<Self, IdentityError> {
        let hasher = match config.pepper_bytes() {
            Some(pepper) => CredentialHasher::with_pepper(pepper)?,
            None => CredentialHasher::new()?,
        };
        let fallback_hash = hasher.hash(FALLBACK_SECRET)?;

        Ok(Self {
            store,
            hasher,
            tokens: TokenGenerator::new(),
            token_length: config.token_length(),
            fallback_hash,
        })
    }

    /// The hasher this service verifies against. Hosts use it to produce the
    /// stored hash when seeding records.
    #[must_use]
    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    /// Verify `secret` for `name`; on success hand back a fresh token and the
    /// account's classification.
    ///
    /// Unknown user and wrong secret both come back as
    /// [`IdentityError::AuthFailure`] with nothing to tell them apart. A
    /// mismatch bumps the account's attempt counter; a success resets it.
    #[instrument(skip(self, secret))]
    pub async fn authenticate(
        &self,
        name: &str,
        secret: &str,
    ) -> Result<AuthSuccess, IdentityError> {
        validate_name(name)?;

        let Some(user) = self.fetch(name).await? else {
            // Burn a verification against the fallback hash so missing users
            // cost the same as mismatches.
            let _ = self.hasher.verify(secret, &self.fallback_hash);
            return Err(IdentityError::AuthFailure);
        };

        if !self.hasher.verify(secret, user.password_hash()) {
            self.store
                .record_failed_login(name)
                .await
                .map_err(|err| storage_failure("failed login bookkeeping", &err))?;
            return Err(IdentityError::AuthFailure);
        }

        self.store
            .reset_login_attempts(name)
            .await
            .map_err(|err| storage_failure("attempt counter reset", &err))?;

        let token = self.tokens.generate(self.token_length)?;
        let classification = classifier::classify(Some(&user));

        Ok(AuthSuccess {
            token,
            classification,
        })
    }

    /// Raw record snapshot for the caller to present. Escaping any field
    /// before it reaches a display surface is entirely the caller's job.
    #[instrument(skip(self))]
    pub async fn lookup(&self, name: &str) -> Result<UserRecord, IdentityError> {
        validate_name(name)?;
        self.fetch(name).await?.ok_or(IdentityError::NotFound)
    }

    /// Classify the named account; an absent user is [`Classification::Unknown`].
    #[instrument(skip(self))]
    pub async fn classify(&self, name: &str) -> Result<Classification, IdentityError> {
        validate_name(name)?;
        let user = self.fetch(name).await?;
        Ok(classifier::classify(user.as_ref()))
    }

    /// Throttling decision for the named account's attempt counter.
    #[instrument(skip(self))]
    pub async fn rate_limit(&self, name: &str) -> Result<RateLimitDecision, IdentityError> {
        validate_name(name)?;
        let user = self.fetch(name).await?.ok_or(IdentityError::NotFound)?;
        Ok(rate_limit::decide(user.login_attempts()))
    }

    async fn fetch(&self, name: &str) -> Result<Option<UserRecord>, IdentityError> {
        self.store
            .find_by_name(name)
            .await
            .map_err(|err| storage_failure("user lookup", &err))
    }
}

fn validate_name(name: &str) -> Result<(), IdentityError> {
    if name.is_empty() {
        return Err(IdentityError::InvalidArgument("name must not be empty"));
    }
    Ok(())
}

/// Log the full chain internally, hand the caller the fixed variant.
fn storage_failure(operation: &str, err: &anyhow::Error) -> IdentityError {
    error!("{operation} failed: {err:#}");
    IdentityError::StorageUnavailable
}
