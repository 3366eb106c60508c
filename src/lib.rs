//! # Identeco (user-identity core)
//!
//! `identeco` is the identity core behind a user-facing product layer. It
//! authenticates credentials, issues opaque session tokens, classifies
//! accounts by behavioral risk signals, and answers lookups against a backing
//! user store.
//!
//! ## Boundary
//!
//! The whole inbound surface is the four operations on
//! [`IdentityService`]: `authenticate`, `lookup`, `classify`, and
//! `rate_limit`. Results are structured values and errors come from the
//! closed [`IdentityError`] set; presentation and output escaping belong to
//! the caller.
//!
//! - **Credentials:** Argon2id with per-hash salts and an optional
//!   server-side pepper. Stored hashes are opaque PHC strings produced and
//!   verified only by [`identity::password::CredentialHasher`].
//! - **Tokens:** fixed-alphabet bearer strings from a CSPRNG; the core hands
//!   them out and never stores them.
//! - **Storage:** the [`UserStore`] capability (exact-name fetch plus attempt
//!   counter maintenance), backed by Postgres with bound parameters or by the
//!   in-memory store. Driver failures never cross the service boundary as
//!   text.
//! - **Enumeration resistance:** unknown user and wrong secret are the same
//!   [`IdentityError::AuthFailure`], and missing users still pay for a hash
//!   verification.

pub mod config;
pub mod error;
pub mod identity;
pub mod store;
pub mod telemetry;

pub use config::{ServiceConfig, StoreConfig};
pub use error::IdentityError;
pub use identity::{
    classifier::Classification, rate_limit::RateLimitDecision, token::Token, AuthSuccess,
    IdentityService,
};
pub use store::{memory::MemoryStore, postgres::PgUserStore, UserRecord, UserStore};
