//! Resilience patterns for transient failures
//!
//! Currently a single pattern: bounded retry with capped exponential
//! backoff. The executor is generic over the error type; what counts as
//! retryable is decided by a [`RetryPolicy`] supplied by the caller.

pub mod retry;

pub use retry::{
    policies, retry, retry_with_policy, RetryConfig, RetryConfigBuilder, RetryDecision,
    RetryError, RetryExecutor, RetryOutcome, RetryPolicy,
};
