//! Auth error types.

use thiserror::Error;

/// Errors that can occur in auth operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Caller lacks the required role.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Credentials did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password hashing or verification failed.
    #[error("Password hash error: {0}")]
    Hash(String),

    /// Backend failure.
    #[error("Auth backend error: {0}")]
    Backend(String),
}
