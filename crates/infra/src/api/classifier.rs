//! Failure classification
//!
//! [`classify`] is the only place a raw [`ApiError`] becomes a
//! [`NormalizedError`]. It is pure: the session side effect of a 401 is
//! applied by the client when it sees [`NormalizedError::SessionExpired`].

use courier_common::resilience::{RetryDecision, RetryPolicy};
use courier_domain::{ErrorCode, NormalizedError};
use serde_json::json;
use tracing::{debug, warn};

use super::errors::{ApiError, ErrorBody};

/// Map a raw attempt failure on `endpoint` to its normalized form.
pub fn classify(error: &ApiError, endpoint: &str) -> NormalizedError {
    match error {
        ApiError::Network(detail) => {
            warn!(endpoint, error = %detail, "Network failure");
            NormalizedError::network(detail.clone())
        }
        ApiError::Timeout(timeout) => {
            warn!(endpoint, timeout_ms = timeout.as_millis() as u64, "Request timed out");
            NormalizedError::timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
        }
        ApiError::Cancelled => NormalizedError::cancelled(),
        ApiError::Status { status, .. } => {
            classify_status(*status, error.error_body().unwrap_or_default(), endpoint)
        }
        ApiError::Decode(reason) => {
            warn!(endpoint, reason = %reason, "Response body could not be decoded");
            NormalizedError::unknown(Some(json!({ "reason": reason })))
        }
        ApiError::Config(reason) => {
            warn!(endpoint, reason = %reason, "Request could not be built");
            NormalizedError::unknown(Some(json!({ "reason": reason })))
        }
    }
}

fn classify_status(status: u16, body: ErrorBody, endpoint: &str) -> NormalizedError {
    debug!(endpoint, status, code = ?body.code, "Classifying HTTP failure");

    match status {
        401 => NormalizedError::session_expired(),
        403 => NormalizedError::forbidden(body.details),
        404 => NormalizedError::not_found(body.details),
        429 => NormalizedError::rate_limited(body.details),
        s if s >= 500 => NormalizedError::server(s, body.details),
        _ => match body.message {
            Some(message) => NormalizedError::Reported {
                status,
                code: body.code.unwrap_or_else(|| ErrorCode::UnknownError.to_string()),
                message,
                details: body.details,
                retryable: body.retryable.unwrap_or(false),
            },
            None => NormalizedError::unknown(Some(json!({ "status": status }))),
        },
    }
}

/// Retry policy driven by the normalized classification
///
/// Stops on anything non-retryable, and always on 401/403 regardless of
/// what the classification says.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifiedRetryPolicy;

impl RetryPolicy<NormalizedError> for ClassifiedRetryPolicy {
    fn should_retry(&self, error: &NormalizedError, attempt: u32) -> RetryDecision {
        if !error.is_retryable() || matches!(error.status(), 401 | 403) {
            debug!(attempt, code = error.code(), "Not retrying");
            RetryDecision::Stop
        } else {
            RetryDecision::Retry
        }
    }
}
