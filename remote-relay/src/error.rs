//! Error types for the relay.

use crate::limits::RateLimitError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use remote_types::ErrorBody;

/// Main error type for relay operations.
///
/// Unknown devices and credential mismatches collapse into a single variant
/// per operation so responses never reveal which device IDs exist.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Missing or invalid request fields.
    #[error("bad request: {reason}")]
    BadRequest {
        /// Reason the request was rejected.
        reason: String,
    },

    /// Unknown device or wrong PIN hash on command submission.
    #[error("invalid device or PIN")]
    Forbidden,

    /// Unknown device or stale device token; the Mac must re-register.
    #[error("device not registered")]
    NotRegistered,

    /// The phone presented a session token from an old QR code.
    #[error("session expired")]
    SessionExpired,

    /// Rate limit exceeded.
    #[error("rate limit exceeded: {0}")]
    RateLimited(#[from] RateLimitError),

    /// Appending to the usage-event log failed.
    #[error("event log error: {0}")]
    EventLog(#[from] std::io::Error),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Shorthand for [`RelayError::BadRequest`].
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::BadRequest {
            reason: reason.into(),
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotRegistered => StatusCode::NOT_FOUND,
            Self::SessionExpired => StatusCode::GONE,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::EventLog(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-visible message. Internal details stay in the logs.
    pub fn detail(&self) -> String {
        match self {
            Self::BadRequest { reason } => reason.clone(),
            Self::Forbidden => "Invalid device or PIN".to_string(),
            Self::NotRegistered => "Device not registered".to_string(),
            Self::SessionExpired => "Session expired. Scan new QR code.".to_string(),
            Self::RateLimited(_) => "Too many requests. Please wait.".to_string(),
            Self::EventLog(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (
            status,
            Json(ErrorBody {
                detail: self.detail(),
            }),
        )
            .into_response()
    }
}

/// Storage layer errors.
///
/// These keep the precise reason for logs and metrics; the relay folds
/// them into [`RelayError`] before anything reaches a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No record for the device ID.
    #[error("unknown device")]
    UnknownDevice,

    /// PIN digest or device token does not match the stored value.
    #[error("credential mismatch")]
    CredentialMismatch,

    /// Session token does not match the Mac's current QR code.
    #[error("session mismatch")]
    SessionMismatch,
}

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            RelayError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RelayError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            RelayError::NotRegistered.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(RelayError::SessionExpired.status_code(), StatusCode::GONE);
        assert_eq!(
            RelayError::RateLimited(RateLimitError::CommandLimitExceeded).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn internal_details_not_exposed() {
        let err = RelayError::Internal("getrandom exploded".into());
        assert_eq!(err.detail(), "Internal server error");

        let err = RelayError::EventLog(std::io::Error::other("disk full"));
        assert!(!err.detail().contains("disk"));
    }
}
