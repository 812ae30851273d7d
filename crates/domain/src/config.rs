//! Client configuration
//!
//! Supplied once at client construction. Only `timeout` and the retry switch
//! can be overridden per call; everything else is fixed for the lifetime of
//! the client instance.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_CACHE_SWEEP_INTERVAL_MS, DEFAULT_CACHE_TTL_MS, DEFAULT_HEALTH_PATH,
    DEFAULT_LOADING_CHANNEL_CAPACITY, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_INITIAL_DELAY_MS,
    DEFAULT_RETRY_MAX_DELAY_MS, DEFAULT_TIMEOUT_MS,
};
use crate::errors::{CourierError, Result};
use crate::utils::serde::duration_millis;

/// Configuration for one API client instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every endpoint is appended to (e.g. "https://api.example.com/v1")
    pub base_url: String,
    /// Default per-call timeout
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
    /// Retries after the first attempt
    pub retry_attempts: u32,
    /// Delay before the first retry
    #[serde(with = "duration_millis")]
    pub retry_initial_delay: Duration,
    /// Upper bound for the doubling backoff
    #[serde(with = "duration_millis")]
    pub retry_max_delay: Duration,
    /// How often expired cache entries are swept
    #[serde(with = "duration_millis")]
    pub cache_sweep_interval: Duration,
    /// TTL used when a cached call does not name one
    #[serde(with = "duration_millis")]
    pub default_cache_ttl: Duration,
    /// Liveness path used by the health check
    pub health_path: String,
    /// Buffer size of the loading and session broadcast channels
    pub loading_channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_initial_delay: Duration::from_millis(DEFAULT_RETRY_INITIAL_DELAY_MS),
            retry_max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
            cache_sweep_interval: Duration::from_millis(DEFAULT_CACHE_SWEEP_INTERVAL_MS),
            default_cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            loading_channel_capacity: DEFAULT_LOADING_CHANNEL_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    /// Check the configuration for values the client cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `CourierError::Config` when the base URL is missing or not an
    /// absolute http(s) URL, the timeout or sweep interval is zero, the
    /// channel capacity is zero, or the initial retry delay exceeds the
    /// maximum delay.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(CourierError::Config("base_url must not be empty".to_string()));
        }

        let parsed = Url::parse(&self.base_url)
            .map_err(|e| CourierError::Config(format!("Invalid base_url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CourierError::Config(format!(
                "base_url must use http or https, got {}",
                parsed.scheme()
            )));
        }

        if self.timeout.is_zero() {
            return Err(CourierError::Config("timeout must be greater than 0".to_string()));
        }

        if self.cache_sweep_interval.is_zero() {
            return Err(CourierError::Config(
                "cache_sweep_interval must be greater than 0".to_string(),
            ));
        }

        if self.loading_channel_capacity == 0 {
            return Err(CourierError::Config(
                "loading_channel_capacity must be greater than 0".to_string(),
            ));
        }

        if self.retry_initial_delay > self.retry_max_delay {
            return Err(CourierError::Config(format!(
                "retry_initial_delay ({:?}) exceeds retry_max_delay ({:?})",
                self.retry_initial_delay, self.retry_max_delay
            )));
        }

        Ok(())
    }

    /// `base_url` joined with an endpoint path, without doubling slashes.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if endpoint.is_empty() {
            base.to_string()
        } else if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_initial_delay, Duration::from_secs(1));
        assert_eq!(config.retry_max_delay, Duration::from_secs(10));
        assert_eq!(config.cache_sweep_interval, Duration::from_secs(60));
        assert_eq!(config.health_path, "/health");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        assert!(ClientConfig::with_base_url("").validate().is_err());
        assert!(ClientConfig::with_base_url("not a url").validate().is_err());
        assert!(ClientConfig::with_base_url("ftp://example.com").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_backoff_bounds() {
        let config = ClientConfig {
            retry_initial_delay: Duration::from_secs(20),
            ..ClientConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CourierError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig { timeout: Duration::ZERO, ..ClientConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let config = ClientConfig::with_base_url("https://api.example.com/v1/");
        assert_eq!(config.endpoint_url("/widgets"), "https://api.example.com/v1/widgets");
        assert_eq!(config.endpoint_url("widgets"), "https://api.example.com/v1/widgets");
        assert_eq!(config.endpoint_url(""), "https://api.example.com/v1");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "https://x.test", "timeout": 1500}"#).unwrap();
        assert_eq!(config.base_url, "https://x.test");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.retry_attempts, 3);
    }
}
