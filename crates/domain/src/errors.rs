//! Error types for fallible setup operations
//!
//! Request failures never surface as `Err`; they are carried inside a
//! [`ResponseEnvelope`](crate::ResponseEnvelope). The errors below cover the
//! operations around a call: building a client, loading configuration and
//! persisting credentials.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Courier setup operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CourierError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for Courier setup operations
pub type Result<T> = std::result::Result<T, CourierError>;
