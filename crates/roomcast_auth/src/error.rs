//! Error types for authentication operations.

use thiserror::Error;

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur during authentication operations.
///
/// Variants deliberately carry no detail about which part of a
/// credential check failed; the reason goes to the log, not the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown user, wrong password hash, or wrong old hash on change.
    #[error("unauthorized")]
    Unauthorized,

    /// The token is malformed, forged, or refers to an unknown user.
    #[error("invalid token")]
    InvalidToken,
}
