//! Normalized request failures
//!
//! Every failed attempt is classified exactly once into a
//! [`NormalizedError`]. The enum is closed: downstream code matches on the
//! variant instead of probing optional fields, and the retry decision reads
//! [`NormalizedError::is_retryable`] rather than re-deriving it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{
    MESSAGE_CANCELLED, MESSAGE_FORBIDDEN, MESSAGE_NETWORK_ERROR, MESSAGE_NOT_FOUND,
    MESSAGE_RATE_LIMITED, MESSAGE_SERVER_ERROR, MESSAGE_SESSION_EXPIRED, MESSAGE_TIMEOUT,
    MESSAGE_UNKNOWN_ERROR,
};
use crate::impl_wire_name_conversions;

/// Closed taxonomy of error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Transport failure or timeout (status 0) - retryable
    NetworkError,
    /// 401, the credential is no longer valid - never retried
    Unauthorized,
    /// 403 - never retried
    Forbidden,
    /// 404 - non-retryable
    NotFound,
    /// 429 - retryable
    RateLimited,
    /// 5xx - retryable
    ServerError,
    /// Anything else - non-retryable
    UnknownError,
    /// Caller cancelled the call - non-retryable
    RequestCancelled,
}

impl_wire_name_conversions!(ErrorCode {
    NetworkError => "NETWORK_ERROR",
    Unauthorized => "UNAUTHORIZED",
    Forbidden => "FORBIDDEN",
    NotFound => "NOT_FOUND",
    RateLimited => "RATE_LIMITED",
    ServerError => "SERVER_ERROR",
    UnknownError => "UNKNOWN_ERROR",
    RequestCancelled => "REQUEST_CANCELLED",
});

impl ErrorCode {
    /// Retryability is fixed per code.
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::NetworkError | Self::RateLimited | Self::ServerError)
    }
}

/// A classified request failure
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedError {
    /// The request never produced an HTTP response
    #[error("{message}")]
    Network {
        message: String,
        timed_out: bool,
        details: Option<Value>,
    },

    /// The server rejected the credential (401)
    #[error("{message}")]
    SessionExpired { message: String },

    #[error("{message}")]
    Forbidden { message: String, details: Option<Value> },

    #[error("{message}")]
    NotFound { message: String, details: Option<Value> },

    #[error("{message}")]
    RateLimited { message: String, details: Option<Value> },

    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// A failure that described itself: status, code and message are taken
    /// from the structured error body.
    #[error("{message}")]
    Reported {
        status: u16,
        code: String,
        message: String,
        details: Option<Value>,
        retryable: bool,
    },

    /// The caller cancelled the request before it completed
    #[error("{message}")]
    Cancelled { message: String },

    #[error("{message}")]
    Unknown { message: String, details: Option<Value> },
}

impl NormalizedError {
    /// Transport-level failure. `detail` is the raw transport text, kept out
    /// of the user-facing message.
    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            message: MESSAGE_NETWORK_ERROR.to_string(),
            timed_out: false,
            details: Some(Value::String(detail.into())),
        }
    }

    /// The transport call exceeded its timeout.
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Network {
            message: MESSAGE_TIMEOUT.to_string(),
            timed_out: true,
            details: Some(serde_json::json!({ "timeoutMs": timeout_ms })),
        }
    }

    pub fn session_expired() -> Self {
        Self::SessionExpired { message: MESSAGE_SESSION_EXPIRED.to_string() }
    }

    pub fn forbidden(details: Option<Value>) -> Self {
        Self::Forbidden { message: MESSAGE_FORBIDDEN.to_string(), details }
    }

    pub fn not_found(details: Option<Value>) -> Self {
        Self::NotFound { message: MESSAGE_NOT_FOUND.to_string(), details }
    }

    pub fn rate_limited(details: Option<Value>) -> Self {
        Self::RateLimited { message: MESSAGE_RATE_LIMITED.to_string(), details }
    }

    pub fn server(status: u16, details: Option<Value>) -> Self {
        Self::Server { status, message: MESSAGE_SERVER_ERROR.to_string(), details }
    }

    pub fn cancelled() -> Self {
        Self::Cancelled { message: MESSAGE_CANCELLED.to_string() }
    }

    pub fn unknown(details: Option<Value>) -> Self {
        Self::Unknown { message: MESSAGE_UNKNOWN_ERROR.to_string(), details }
    }

    /// Wire code of this failure. `Reported` failures surface their own code
    /// verbatim.
    pub fn code(&self) -> &str {
        match self {
            Self::Network { .. } => ErrorCode::NetworkError.as_str(),
            Self::SessionExpired { .. } => ErrorCode::Unauthorized.as_str(),
            Self::Forbidden { .. } => ErrorCode::Forbidden.as_str(),
            Self::NotFound { .. } => ErrorCode::NotFound.as_str(),
            Self::RateLimited { .. } => ErrorCode::RateLimited.as_str(),
            Self::Server { .. } => ErrorCode::ServerError.as_str(),
            Self::Reported { code, .. } => code,
            Self::Cancelled { .. } => ErrorCode::RequestCancelled.as_str(),
            Self::Unknown { .. } => ErrorCode::UnknownError.as_str(),
        }
    }

    /// Taxonomy code, when the code belongs to the closed set.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code().parse().ok()
    }

    /// Numeric status. 0 is reserved for failures without an HTTP response.
    pub fn status(&self) -> u16 {
        match self {
            Self::Network { .. } | Self::Cancelled { .. } => 0,
            Self::SessionExpired { .. } => 401,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::RateLimited { .. } => 429,
            Self::Server { status, .. } | Self::Reported { status, .. } => *status,
            Self::Unknown { .. } => 500,
        }
    }

    /// Human-readable message for the envelope and the notifier.
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message, .. }
            | Self::SessionExpired { message }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::RateLimited { message, .. }
            | Self::Server { message, .. }
            | Self::Reported { message, .. }
            | Self::Cancelled { message }
            | Self::Unknown { message, .. } => message,
        }
    }

    /// Structured details carried from the error body or the transport.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Network { details, .. }
            | Self::Forbidden { details, .. }
            | Self::NotFound { details, .. }
            | Self::RateLimited { details, .. }
            | Self::Server { details, .. }
            | Self::Reported { details, .. }
            | Self::Unknown { details, .. } => details.as_ref(),
            Self::SessionExpired { .. } | Self::Cancelled { .. } => None,
        }
    }

    /// Whether the retry engine may attempt the call again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::RateLimited { .. } | Self::Server { .. } => true,
            Self::Reported { retryable, status, .. } => {
                *retryable && !matches!(status, 401 | 403)
            }
            Self::SessionExpired { .. }
            | Self::Forbidden { .. }
            | Self::NotFound { .. }
            | Self::Cancelled { .. }
            | Self::Unknown { .. } => false,
        }
    }

    /// `true` for the failure that invalidates the client's credential.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// Replace the human-readable message, keeping the classification.
    #[must_use]
    pub fn with_message(mut self, new_message: impl Into<String>) -> Self {
        let new_message = new_message.into();
        match &mut self {
            Self::Network { message, .. }
            | Self::SessionExpired { message }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::RateLimited { message, .. }
            | Self::Server { message, .. }
            | Self::Reported { message, .. }
            | Self::Cancelled { message }
            | Self::Unknown { message, .. } => *message = new_message,
        }
        self
    }
}
