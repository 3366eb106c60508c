//! Credential hashing and verification.
//!
//! Secrets are Argon2id-hashed with a per-hash random salt and an optional
//! server-side pepper. The encoded PHC string this module produces is the only
//! form a password ever takes at rest; nothing else in the crate builds or
//! compares hashes.

use crate::error::IdentityError;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use std::sync::Arc;

/// Slow, salted password hasher.
pub struct CredentialHasher {
    pepper: Option<Arc<[u8]>>,
}

impl CredentialHasher {
    /// Hasher with default Argon2id parameters and no pepper.
    pub fn new() -> Result<Self, IdentityError> {
        let hasher = Self { pepper: None };
        hasher.engine()?;
        Ok(hasher)
    }

    /// Hasher mixing a server-side pepper into every hash.
    ///
    /// Fails with [`IdentityError::HashingUnavailable`] when the primitive
    /// rejects the pepper; construction is the place to find out, not the
    /// first request.
    pub fn with_pepper(pepper: &[u8]) -> Result<Self, IdentityError> {
        let hasher = Self {
            pepper: Some(Arc::from(pepper)),
        };
        hasher.engine()?;
        Ok(hasher)
    }

    fn engine(&self) -> Result<Argon2<'_>, IdentityError> {
        match self.pepper.as_deref() {
            Some(pepper) => Argon2::new_with_secret(
                pepper,
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                argon2::Params::default(),
            )
            .map_err(|_| IdentityError::HashingUnavailable),
            None => Ok(Argon2::default()),
        }
    }

    /// Hash a secret into an encoded PHC string.
    ///
    /// The embedded random salt makes repeated calls on the same secret
    /// produce distinct encodings; all of them verify.
    pub fn hash(&self, secret: &str) -> Result<String, IdentityError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .engine()?
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|_| IdentityError::HashingUnavailable)?
            .to_string();
        Ok(hash)
    }

    /// Check a secret against a stored hash. Malformed stored values verify
    /// as `false`, never as an error a caller could distinguish.
    #[must_use]
    pub fn verify(&self, secret: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        self.engine()
            .is_ok_and(|argon2| argon2.verify_password(secret.as_bytes(), &parsed).is_ok())
    }
}
