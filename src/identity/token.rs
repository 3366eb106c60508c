//! Opaque bearer-token generation.

use crate::error::IdentityError;
use rand::{rngs::OsRng, CryptoRng, Rng, RngCore};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Every token character is drawn from this alphabet.
pub const TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// An opaque session token. Carries no decodable structure; its value is the
/// whole credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Tokens are bearer credentials; keep them out of debug logs.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&"<redacted>").finish()
    }
}

/// Token source backed by a cryptographically secure generator.
///
/// The `CryptoRng` bound keeps seeded statistical generators out of token
/// paths; swap the source only for deterministic substitutes in tests.
pub struct TokenGenerator<R = OsRng> {
    rng: Mutex<R>,
}

impl TokenGenerator<OsRng> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for TokenGenerator<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> TokenGenerator<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Generate a token of exactly `length` characters.
    pub fn generate(&self, length: usize) -> Result<Token, IdentityError> {
        if length == 0 {
            return Err(IdentityError::InvalidArgument(
                "token length must be positive",
            ));
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let token = (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..TOKEN_ALPHABET.len());
                TOKEN_ALPHABET[idx] as char
            })
            .collect();

        Ok(Token(token))
    }
}
