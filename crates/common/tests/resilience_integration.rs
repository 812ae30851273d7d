//! Integration tests for resilience module
//!
//! Tests the retry executor against classified failures and verifies the
//! backoff schedule with paused tokio time

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use courier_common::resilience::{
    policies, retry_with_policy, RetryConfig, RetryDecision, RetryExecutor, RetryPolicy,
};

/// Failure shaped like a classified HTTP error
#[derive(Debug, Clone, PartialEq)]
struct StatusError {
    status: u16,
    retryable: bool,
}

impl StatusError {
    fn new(status: u16) -> Self {
        Self { status, retryable: status == 0 || status == 429 || status >= 500 }
    }
}

/// Stops on non-retryable errors and credential failures.
struct StatusPolicy;

impl RetryPolicy<StatusError> for StatusPolicy {
    fn should_retry(&self, error: &StatusError, _attempt: u32) -> RetryDecision {
        if !error.retryable || matches!(error.status, 401 | 403) {
            RetryDecision::Stop
        } else {
            RetryDecision::Retry
        }
    }
}

/// Validates that a permanently failing retryable call is attempted exactly
/// `1 + max_retries` times with a non-decreasing, capped delay sequence.
#[tokio::test(start_paused = true)]
async fn test_retry_bound_and_schedule() {
    let attempts = Arc::new(AtomicU32::new(0));
    let config = RetryConfig::builder()
        .max_retries(5)
        .initial_delay(Duration::from_millis(1_000))
        .max_delay(Duration::from_millis(10_000))
        .build()
        .unwrap();
    let executor = RetryExecutor::new(config, StatusPolicy);

    let outcome = executor
        .execute_with_outcome(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(StatusError::new(500)) }
        })
        .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 6);
    assert_eq!(outcome.attempts, 6);
    assert_eq!(outcome.result, Err(StatusError::new(500)));

    let millis: Vec<u128> = outcome.delays.iter().map(Duration::as_millis).collect();
    assert_eq!(millis, vec![1_000, 2_000, 4_000, 8_000, 10_000]);
    assert!(outcome.delays.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(outcome.total_delay, Duration::from_millis(25_000));
}

/// Credential failures are attempted once regardless of the budget.
#[tokio::test(start_paused = true)]
async fn test_credential_failures_are_not_retried() {
    for status in [401, 403] {
        let attempts = Arc::new(AtomicU32::new(0));
        let result = retry_with_policy(RetryConfig::default(), StatusPolicy, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                Err::<(), _>(StatusError { status, retryable: true })
            }
        })
        .await;

        assert_eq!(result.unwrap_err().status, status);
        assert_eq!(attempts.load(Ordering::SeqCst), 1, "status {status} must not be retried");
    }
}

/// A transient failure followed by success returns the value.
#[tokio::test(start_paused = true)]
async fn test_recovery_after_rate_limit() {
    let attempts = Arc::new(AtomicU32::new(0));
    let result = retry_with_policy(RetryConfig::default(), StatusPolicy, || {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                Err(StatusError::new(429))
            } else {
                Ok("recovered")
            }
        }
    })
    .await;

    assert_eq!(result, Ok("recovered"));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

/// Backoff sleeps are tokio sleeps, so paused time advances by the scheduled
/// delays.
#[tokio::test(start_paused = true)]
async fn test_elapsed_time_matches_schedule() {
    let config = RetryConfig::builder()
        .max_retries(2)
        .initial_delay(Duration::from_millis(100))
        .max_delay(Duration::from_millis(1_000))
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let result = retry_with_policy(config, policies::AlwaysRetry, || async {
        Err::<(), _>("unavailable")
    })
    .await;

    assert_eq!(result, Err("unavailable"));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(300), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(310), "elapsed {elapsed:?}");
}
