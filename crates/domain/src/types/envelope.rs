//! Uniform result shape returned by every client operation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::failure::NormalizedError;
use crate::constants::MESSAGE_SERVED_FROM_CACHE;

/// Result of one client call.
///
/// Callers branch on `success`: when it is `true`, `data` holds the payload
/// (which may itself be `None` for an empty body); when it is `false`,
/// `error` is a non-empty message and `data` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
    /// Error code of a failed call
    pub code: Option<String>,
    pub status: Option<u16>,
    pub timestamp: DateTime<Utc>,
    /// The payload was served from the response cache
    #[serde(default)]
    pub from_cache: bool,
}

impl<T> ResponseEnvelope<T> {
    /// Successful network response.
    pub fn success(data: Option<T>, message: Option<String>, status: u16) -> Self {
        Self {
            success: true,
            data,
            message,
            error: None,
            code: None,
            status: Some(status),
            timestamp: Utc::now(),
            from_cache: false,
        }
    }

    /// Successful response served without a network call.
    pub fn cached(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(MESSAGE_SERVED_FROM_CACHE.to_string()),
            error: None,
            code: None,
            status: None,
            timestamp: Utc::now(),
            from_cache: true,
        }
    }

    /// Failed call. The error string is never empty.
    pub fn failure(error: &NormalizedError) -> Self {
        let message = if error.message().trim().is_empty() {
            error.code().to_string()
        } else {
            error.message().to_string()
        };

        Self {
            success: false,
            data: None,
            message: None,
            error: Some(message),
            code: Some(error.code().to_string()),
            status: Some(error.status()),
            timestamp: Utc::now(),
            from_cache: false,
        }
    }

    /// Convert the payload, keeping every other field.
    ///
    /// # Errors
    ///
    /// Returns the converter's error when the payload cannot be converted.
    pub fn try_map_data<U, E, F>(self, convert: F) -> Result<ResponseEnvelope<U>, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        let data = self.data.map(convert).transpose()?;
        Ok(ResponseEnvelope {
            success: self.success,
            data,
            message: self.message,
            error: self.error,
            code: self.code,
            status: self.status,
            timestamp: self.timestamp,
            from_cache: self.from_cache,
        })
    }

    /// Collapse into a `Result`, for callers that prefer `?`.
    ///
    /// # Errors
    ///
    /// Returns the envelope's error message when `success` is `false`.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}
