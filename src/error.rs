//! Error types.
//!
//! Backends return [`BackendError`]. Actions wrap it in an
//! [`OperationError`], which carries the operation name, some context for
//! logs, a message that is safe to show to the end user, and a coarse
//! [`ErrorCode`]. Nothing is retried.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Failure reported by a membership backend (SQL pool, REST gateway, mock).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("database error: {0}")]
    Database(String),

    #[error("remote call returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// The remote procedure succeeded but produced nothing usable
    /// (no token, no rows).
    #[error("{0} returned no result")]
    EmptyResult(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx_postgres")]
impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<crate::membership::UnknownValue> for BackendError {
    fn from(err: crate::membership::UnknownValue) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Coarse classification of an [`OperationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    CreateFailed,
    ReadFailed,
    UpdateFailed,
    DeleteFailed,
    ValidationFailed,
    PermissionDenied,
    NotFound,
    Conflict,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateFailed => "CREATE_FAILED",
            Self::ReadFailed => "READ_FAILED",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::DeleteFailed => "DELETE_FAILED",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error type surfaced by invitation actions.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{operation} failed ({code}): {context}")]
pub struct OperationError {
    /// Name of the failing operation, e.g. `"invite_org_member"`.
    pub operation: &'static str,
    /// Free-form detail for logs. May contain identifiers; never shown to users.
    pub context: String,
    /// User-facing message.
    pub message: String,
    pub code: ErrorCode,
    #[source]
    pub cause: Option<BackendError>,
}

impl OperationError {
    pub fn new(
        operation: &'static str,
        code: ErrorCode,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            context: context.into(),
            message: message.into(),
            code,
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: BackendError) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn validation(operation: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(operation, ErrorCode::ValidationFailed, message.clone(), message)
    }

    /// Wraps a backend failure, logging it once at the boundary.
    pub fn backend(
        operation: &'static str,
        code: ErrorCode,
        context: impl Into<String>,
        message: impl Into<String>,
        cause: BackendError,
    ) -> Self {
        let context = context.into();
        log::error!(
            target: "orgkit",
            "msg=\"operation failed\", operation=\"{operation}\", code=\"{code}\", context=\"{context}\", error=\"{cause}\""
        );
        Self::new(operation, code, context, message).with_cause(cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::CreateFailed.as_str(), "CREATE_FAILED");
        assert_eq!(ErrorCode::ValidationFailed.to_string(), "VALIDATION_FAILED");
        assert_eq!(
            serde_json::to_string(&ErrorCode::PermissionDenied).unwrap(),
            "\"PERMISSION_DENIED\""
        );
    }

    #[test]
    fn test_operation_error_display_uses_context_not_message() {
        let err = OperationError::new(
            "revoke_invitation",
            ErrorCode::DeleteFailed,
            "token lookup failed",
            "Could not revoke the invitation",
        );
        assert_eq!(
            err.to_string(),
            "revoke_invitation failed (DELETE_FAILED): token lookup failed"
        );
        assert!(err.cause.is_none());
    }

    #[test]
    fn test_backend_cause_is_source() {
        use std::error::Error;

        let err = OperationError::backend(
            "process_invitation",
            ErrorCode::UpdateFailed,
            "rpc failed",
            "Could not accept the invitation",
            BackendError::Transport("connection reset".to_owned()),
        );
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("transport error: connection reset"));
    }

    #[test]
    fn test_validation_sets_code() {
        let err = OperationError::validation("invite_org_member", "Invalid email format");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Invalid email format");
    }
}
