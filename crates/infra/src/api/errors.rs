//! Raw failures of a single transport attempt
//!
//! [`ApiError`] records what happened on the wire. It never reaches callers
//! of the client: the classifier turns it into a
//! [`courier_domain::NormalizedError`].

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response was received (DNS, connect, reset, TLS)
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,

    /// The server answered with a non-2xx status
    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    /// A 2xx body that could not be read as the expected payload
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request could not be assembled (bad header, bad URL)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Structured error body of a status failure, when it parses.
    pub fn error_body(&self) -> Option<ErrorBody> {
        match self {
            Self::Status { body, .. } => ErrorBody::parse(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::Config(err.to_string());
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::Status { status: status.as_u16(), body: String::new() };
        }
        Self::Network(err.to_string())
    }
}

/// Fields a failing service may describe itself with
///
/// Accepts `{"message", "code", "details", "retryable"}`; a string `error`
/// field stands in for a missing `message`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub code: Option<String>,
    pub details: Option<Value>,
    pub retryable: Option<bool>,
}

impl ErrorBody {
    /// Parse a raw response body. Returns `None` unless it is a JSON object.
    pub fn parse(raw: &str) -> Option<Self> {
        let Value::Object(fields) = serde_json::from_str::<Value>(raw).ok()? else {
            return None;
        };

        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            message: text("message").or_else(|| text("error")),
            code: text("code"),
            details: fields.get("details").filter(|d| !d.is_null()).cloned(),
            retryable: fields.get("retryable").and_then(Value::as_bool),
        })
    }
}
