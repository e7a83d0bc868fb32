//! # Service Error Type
//!
//! The single error type the API Surface sees.
//!
//! ## Error Folding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Coin Shop                          │
//! │                                                                         │
//! │  CoreError::UnknownItem ──────────────► ServiceError::UnknownItem  400  │
//! │  CoreError::InvalidOperation ─────────► InvalidOperation           400  │
//! │  CoreError::Validation ───────────────► InvalidOperation           400  │
//! │                                                                         │
//! │  DbError::InsufficientFunds ──────────► InsufficientFunds          400  │
//! │  DbError::NotFound (sender) ──────────► UserNotFound               400  │
//! │  DbError::NotFound (receiver) ────────► InvalidOperation ¹         400  │
//! │  DbError::UniqueViolation ────────────► UserExists                 400  │
//! │  DbError::{ConnectionFailed, Busy,                                      │
//! │           PoolExhausted} ─────────────► StoreUnavailable           500  │
//! │  anything else ───── error! logged ───► Internal                   500  │
//! │                                                                         │
//! │  bad / expired token ─────────────────► Unauthorized               401  │
//! │  wrong password ──────────────────────► InvalidCredentials         401  │
//! │                                                                         │
//! │  ¹ folded by the transaction engine, which knows who the receiver was  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use coinshop_core::{Coins, CoreError};
use coinshop_db::DbError;

/// Errors returned by every public service operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing, malformed, forged or expired token.
    #[error("unauthorized")]
    Unauthorized,

    /// Username exists but the password does not match, or registration is
    /// disabled for an unknown username.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Only ever reports the caller's own balance.
    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: Coins, requested: Coins },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The ledger store could not be reached. Never retried internally.
    #[error("store unavailable")]
    StoreUnavailable,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status an adapter should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unauthorized | ServiceError::InvalidCredentials => 401,
            ServiceError::UserNotFound(_)
            | ServiceError::UserExists(_)
            | ServiceError::UnknownItem(_)
            | ServiceError::InsufficientFunds { .. }
            | ServiceError::InvalidOperation(_) => 400,
            ServiceError::StoreUnavailable | ServiceError::Internal(_) => 500,
        }
    }

    /// Body an adapter should send alongside [`status_code`](Self::status_code).
    ///
    /// Internal details never leave the process; they were logged when the
    /// error was folded.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            ServiceError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        ErrorResponse { errors: message }
    }
}

/// JSON error body: `{"errors": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub errors: String,
}

/// Converts ledger store errors to service errors.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        if err.is_unavailable() {
            tracing::error!(error = %err, "Ledger store unavailable");
            return ServiceError::StoreUnavailable;
        }

        match err {
            DbError::NotFound { id, .. } => ServiceError::UserNotFound(id),
            DbError::UniqueViolation { value, .. } => ServiceError::UserExists(value),
            DbError::InsufficientFunds {
                available,
                requested,
                ..
            } => ServiceError::InsufficientFunds {
                available,
                requested,
            },
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Ledger store operation failed");
                ServiceError::Internal(other.to_string())
            }
        }
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownItem(item) => ServiceError::UnknownItem(item),
            CoreError::InvalidOperation { reason } => ServiceError::InvalidOperation(reason),
            CoreError::Validation(e) => ServiceError::InvalidOperation(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinshop_core::ValidationError;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::Unauthorized.status_code(), 401);
        assert_eq!(ServiceError::InvalidCredentials.status_code(), 401);
        assert_eq!(ServiceError::UnknownItem("yacht".into()).status_code(), 400);
        assert_eq!(
            ServiceError::InsufficientFunds {
                available: Coins::new(1),
                requested: Coins::new(2)
            }
            .status_code(),
            400
        );
        assert_eq!(ServiceError::StoreUnavailable.status_code(), 500);
        assert_eq!(ServiceError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_db_error_folding() {
        let err: ServiceError = DbError::PoolExhausted.into();
        assert!(matches!(err, ServiceError::StoreUnavailable));

        let err: ServiceError = DbError::not_found("User", "ghost").into();
        assert!(matches!(err, ServiceError::UserNotFound(ref u) if u == "ghost"));

        let err: ServiceError = DbError::duplicate("username", "alice").into();
        assert!(matches!(err, ServiceError::UserExists(ref u) if u == "alice"));

        let err: ServiceError = DbError::QueryFailed("syntax".into()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn test_core_error_folding() {
        let err: ServiceError = CoreError::UnknownItem("yacht".into()).into();
        assert!(matches!(err, ServiceError::UnknownItem(_)));

        let err: ServiceError = CoreError::Validation(ValidationError::MustBePositive {
            field: "amount".into(),
        })
        .into();
        assert!(matches!(err, ServiceError::InvalidOperation(ref m) if m == "amount must be positive"));
    }

    #[test]
    fn test_error_response_hides_internals() {
        let body = ServiceError::Internal("disk on fire".into()).to_response();
        assert_eq!(body.errors, "internal error");

        let body = ServiceError::UnknownItem("yacht".into()).to_response();
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"errors":"unknown item: yacht"}"#
        );
    }
}
