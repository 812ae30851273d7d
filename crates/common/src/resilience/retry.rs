//! Retry with capped exponential backoff
//!
//! An operation is attempted once and then retried up to
//! [`RetryConfig::max_retries`] more times. Before every retry the executor
//! sleeps; the first sleep is `initial_delay` and each following one is the
//! previous multiplied by `multiplier`, capped at `max_delay`. Attempts are
//! strictly sequential. When the policy stops or the budget is spent, the
//! last error is returned unchanged.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors raised while building a retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Outcome of a retry execution including result and summary statistics
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    /// Number of times the operation ran (first attempt included)
    pub attempts: u32,
    /// Every backoff sleep, in order
    pub delays: Vec<Duration>,
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }

    /// Number of attempts after the first one.
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// `attempt` is the zero-based index of the attempt that just failed.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the next backoff delay
    Retry,
    /// Retry after the given delay instead of the backoff delay
    RetryAfter(Duration),
    /// Return the error to the caller
    Stop,
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor applied to the delay after every retry
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Delay slept before the retry that follows `previous`.
    pub fn next_delay(&self, previous: Duration) -> Duration {
        previous.mul_f64(self.multiplier).min(self.max_delay)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `RetryError::InvalidConfiguration` when the multiplier is not
    /// a finite value of at least 1.0, or `initial_delay` exceeds
    /// `max_delay`.
    pub fn validate(&self) -> Result<(), RetryError> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(RetryError::InvalidConfiguration {
                message: format!("multiplier must be >= 1.0, got {}", self.multiplier),
            });
        }

        if self.initial_delay > self.max_delay {
            return Err(RetryError::InvalidConfiguration {
                message: format!(
                    "initial_delay ({:?}) exceeds max_delay ({:?})",
                    self.initial_delay, self.max_delay
                ),
            });
        }

        Ok(())
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.config.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.config.multiplier = multiplier;
        self
    }

    /// # Errors
    ///
    /// Returns the validation error of the assembled configuration.
    pub fn build(self) -> Result<RetryConfig, RetryError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Create with default configuration
    pub fn with_policy(policy: P) -> Self {
        Self::new(RetryConfig::default(), policy)
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt when the policy stops or the
    /// retry budget is exhausted.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    #[instrument(skip(self, operation), fields(max_retries = self.config.max_retries))]
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;
        let mut next_delay = self.config.initial_delay;
        let mut delays = Vec::new();

        loop {
            let result = operation().await;
            let attempts = attempt + 1;

            let error = match result {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempts, "Operation succeeded after retry");
                    }
                    return finish(Ok(value), attempts, delays);
                }
                Err(error) => error,
            };

            if attempt >= self.config.max_retries {
                warn!(attempts, error = ?error, "Retry budget exhausted");
                return finish(Err(error), attempts, delays);
            }

            let delay = match self.policy.should_retry(&error, attempt) {
                RetryDecision::Stop => {
                    debug!(attempts, error = ?error, "Retry policy stopped retrying");
                    return finish(Err(error), attempts, delays);
                }
                RetryDecision::Retry => {
                    let delay = next_delay;
                    next_delay = self.config.next_delay(next_delay);
                    delay
                }
                RetryDecision::RetryAfter(custom) => custom,
            };

            warn!(attempt = attempts, delay_ms = delay.as_millis() as u64, "Attempt failed, retrying");
            tokio::time::sleep(delay).await;
            delays.push(delay);
            attempt += 1;
        }
    }
}

fn finish<T, E>(result: Result<T, E>, attempts: u32, delays: Vec<Duration>) -> RetryOutcome<T, E> {
    let total_delay = delays.iter().sum();
    RetryOutcome { result, attempts, delays, total_delay }
}

/// Convenience function to create a retry executor and execute an operation
///
/// # Errors
///
/// Returns the error of the last attempt.
pub async fn retry_with_policy<F, Fut, T, E, P>(
    config: RetryConfig,
    policy: P,
    operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy<E>,
    E: fmt::Debug,
{
    RetryExecutor::new(config, policy).execute(operation).await
}

/// Convenience function to retry with default configuration
///
/// # Errors
///
/// Returns the error of the last attempt.
pub async fn retry<F, Fut, T, E, P>(policy: P, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy<E>,
    E: fmt::Debug,
{
    retry_with_policy(RetryConfig::default(), policy, operation).await
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Retries on any error
    #[derive(Debug, Clone, Copy, Default)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    #[derive(Debug, Clone, Copy, Default)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Predicate-based retry policy
    #[derive(Debug, Clone)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}
