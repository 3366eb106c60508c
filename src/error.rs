//! Caller-facing error taxonomy.

use thiserror::Error;

/// The closed set of failures reported to callers.
///
/// Display strings are fixed phrases: driver errors, crypto errors, and
/// anything else raised below the service boundary are logged server-side and
/// mapped onto one of these variants before they reach a caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    /// Malformed input, rejected before any work happens.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No user matched the requested name.
    #[error("user not found")]
    NotFound,

    /// Credential mismatch or missing user; deliberately undifferentiated so
    /// callers cannot probe which accounts exist.
    #[error("authentication failed")]
    AuthFailure,

    /// The backing store was unreachable or timed out.
    #[error("storage unavailable")]
    StorageUnavailable,

    /// The password hashing primitive could not be initialized. Fatal at
    /// startup, not a per-request condition.
    #[error("password hashing unavailable")]
    HashingUnavailable,
}

#[cfg(test)]
mod tests {
    use super::IdentityError;

    #[test]
    fn display_carries_no_internal_detail() {
        assert_eq!(IdentityError::NotFound.to_string(), "user not found");
        assert_eq!(
            IdentityError::AuthFailure.to_string(),
            "authentication failed"
        );
        assert_eq!(
            IdentityError::StorageUnavailable.to_string(),
            "storage unavailable"
        );
        assert_eq!(
            IdentityError::HashingUnavailable.to_string(),
            "password hashing unavailable"
        );
    }

    #[test]
    fn invalid_argument_names_the_argument() {
        let err = IdentityError::InvalidArgument("token length must be positive");
        assert_eq!(
            err.to_string(),
            "invalid argument: token length must be positive"
        );
    }

    #[test]
    fn auth_failures_are_indistinguishable() {
        assert_eq!(IdentityError::AuthFailure, IdentityError::AuthFailure);
    }
}
