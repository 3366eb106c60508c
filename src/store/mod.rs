//! User storage: the record type, the store capability, and its backends.

use crate::error::IdentityError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

pub mod memory;
pub mod postgres;

/// Basic email format check.
fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// Read-only snapshot of a stored user.
///
/// Accessors hand out independent copies; mutating what they return can never
/// reach back into a store. The attempt counter only moves through
/// [`UserStore::record_failed_login`] and [`UserStore::reset_login_attempts`].
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    name: String,
    email: Option<String>,
    #[serde(skip)]
    password_hash: String,
    roles: BTreeSet<String>,
    login_attempts: u32,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a record for insertion into a store.
    ///
    /// The hash must come from
    /// [`CredentialHasher::hash`](crate::identity::password::CredentialHasher::hash);
    /// nothing else in the crate produces or compares one.
    pub fn new(
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let name = name.into();
        if name.is_empty() {
            return Err(IdentityError::InvalidArgument("name must not be empty"));
        }
        Ok(Self {
            name,
            email: None,
            password_hash: password_hash.into(),
            roles: BTreeSet::new(),
            login_attempts: 0,
            created_at: Utc::now(),
        })
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Result<Self, IdentityError> {
        let email = email.into();
        if !valid_email(&email) {
            return Err(IdentityError::InvalidArgument("invalid email format"));
        }
        self.email = Some(email);
        Ok(self)
    }

    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = String>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_login_attempts(mut self, login_attempts: u32) -> Self {
        self.login_attempts = login_attempts;
        self
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Rebuild a record from stored columns without re-validation.
    pub(crate) fn from_store(
        name: String,
        email: Option<String>,
        password_hash: String,
        roles: BTreeSet<String>,
        login_attempts: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            email,
            password_hash,
            roles,
            login_attempts,
            created_at,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Domain part of the email, when one is present.
    #[must_use]
    pub fn email_domain(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(|email| email.rsplit_once('@'))
            .map(|(_, domain)| domain)
    }

    /// Independent copy of the role set.
    #[must_use]
    pub fn roles(&self) -> BTreeSet<String> {
        self.roles.clone()
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub(crate) fn roles_ref(&self) -> &BTreeSet<String> {
        &self.roles
    }

    #[must_use]
    pub fn login_attempts(&self) -> u32 {
        self.login_attempts
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub(crate) fn bump_login_attempts(&mut self) {
        self.login_attempts = self.login_attempts.saturating_add(1);
    }

    pub(crate) fn clear_login_attempts(&mut self) {
        self.login_attempts = 0;
    }
}

// The hash stays out of debug output along with everything logged through it.
impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("roles", &self.roles)
            .field("login_attempts", &self.login_attempts)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Capability the identity service needs from a user store: fetch a user by
/// exact name and maintain the attempt counter.
///
/// Implementations report failures as plain `anyhow` errors; the service
/// boundary logs the chain and maps it to
/// [`IdentityError::StorageUnavailable`] so no driver detail reaches a caller.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-match lookup. Zero rows is `Ok(None)`, not an error.
    async fn find_by_name(&self, name: &str) -> Result<Option<UserRecord>>;

    /// Increment the user's attempt counter. Unknown names are a no-op.
    async fn record_failed_login(&self, name: &str) -> Result<()>;

    /// Reset the user's attempt counter. Unknown names are a no-op.
    async fn reset_login_attempts(&self, name: &str) -> Result<()>;
}
