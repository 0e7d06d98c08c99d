//! Service-level error taxonomy.
//!
//! Every lower-layer error is folded into one of five classes so a
//! transport adapter only has to map classes, not variants. The class
//! also decides the HTTP status a handler would answer with.

use thiserror::Error;
use vend_auth::AuthError;
use vend_commerce::CommerceError;
use vend_store::StoreError;

/// Errors surfaced by the service layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request is malformed or fails a business rule.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The caller lacks the required role or owns no such record.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The record changed underneath the request; retry from a fresh read.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Something on our side broke.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status a transport adapter should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
        }
    }

    /// True for the 4xx classes the caller can fix.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<CommerceError> for ApiError {
    fn from(e: CommerceError) -> Self {
        match e {
            CommerceError::ProductNotFound(_) | CommerceError::OrderNotFound(_) => {
                ApiError::NotFound(e.to_string())
            }
            CommerceError::OrderNotPending { .. } => ApiError::Conflict(e.to_string()),
            CommerceError::CurrencyMismatch { .. }
            | CommerceError::Overflow
            | CommerceError::SerializationError(_) => ApiError::Internal(e.to_string()),
            // Everything else is a request the buyer can correct.
            other => ApiError::Validation(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound(e.to_string()),
            StoreError::Conflict(_) | StoreError::Duplicate(_) => ApiError::Conflict(e.to_string()),
            StoreError::Serialization(_) | StoreError::Backend(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NotAuthorized(_) | AuthError::InvalidCredentials => {
                ApiError::Unauthorized(e.to_string())
            }
            AuthError::Hash(_) | AuthError::Backend(_) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation("x".into()).status_code(), 400);
        assert_eq!(ApiError::Unauthorized("x".into()).status_code(), 403);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), 409);
        assert_eq!(ApiError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_commerce_error_classification() {
        let e: ApiError = CommerceError::EmptyCart.into();
        assert!(matches!(e, ApiError::Validation(_)));

        let e: ApiError = CommerceError::OrderNotPending { status: "completed" }.into();
        assert!(matches!(e, ApiError::Conflict(_)));

        let e: ApiError = CommerceError::Overflow.into();
        assert!(matches!(e, ApiError::Internal(_)));
    }

    #[test]
    fn test_store_error_classification() {
        let e: ApiError = StoreError::Conflict("order o1 is completed".into()).into();
        assert!(matches!(e, ApiError::Conflict(_)));

        let e: ApiError = StoreError::NotFound("order o1".into()).into();
        assert!(matches!(e, ApiError::NotFound(_)));
    }
}
