//! Per-call request configuration

use std::collections::BTreeMap;
use std::time::Duration;

use courier_domain::HttpMethod;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Response-cache settings of one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Only honoured for GET
    pub enabled: bool,
    /// Overrides the default `METHOD:endpoint` key
    pub key: Option<String>,
    /// Falls back to the client's default TTL
    pub ttl: Option<Duration>,
}

/// Everything a single call may override.
///
/// Request interceptors receive and return this value, so they can add
/// headers or adjust flags before the transport call is built.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: HttpMethod,
    /// Per-call headers; these win over the client's defaults
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    /// Overrides the client's default timeout for this call
    pub timeout: Option<Duration>,
    pub retry: bool,
    pub show_toast: bool,
    pub show_loading: bool,
    pub cache: CacheOptions,
    /// Caller-side cancellation; cancelling aborts the in-flight attempt and
    /// any pending backoff.
    pub cancellation: Option<CancellationToken>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            headers: BTreeMap::new(),
            body: None,
            timeout: None,
            retry: true,
            show_toast: true,
            show_loading: true,
            cache: CacheOptions::default(),
            cancellation: None,
        }
    }
}

impl RequestConfig {
    /// Defaults with `method`.
    pub fn new(method: HttpMethod) -> Self {
        Self { method, ..Self::default() }
    }

    /// Defaults for a GET.
    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a header; it replaces a default header of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// JSON body; ignored for GET.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Timeout of each attempt of this call.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable retrying retryable failures.
    #[must_use]
    pub fn retry(mut self, enabled: bool) -> Self {
        self.retry = enabled;
        self
    }

    /// Make exactly one attempt.
    #[must_use]
    pub fn without_retry(self) -> Self {
        self.retry(false)
    }

    /// Enable or disable success and error toasts.
    #[must_use]
    pub fn show_toast(mut self, enabled: bool) -> Self {
        self.show_toast = enabled;
        self
    }

    /// Enable or disable loading-state tracking.
    #[must_use]
    pub fn show_loading(mut self, enabled: bool) -> Self {
        self.show_loading = enabled;
        self
    }

    /// Enable caching with the client's default TTL.
    #[must_use]
    pub fn cached(mut self) -> Self {
        self.cache.enabled = true;
        self
    }

    /// Enable caching with an explicit TTL.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.enabled = true;
        self.cache.ttl = Some(ttl);
        self
    }

    /// Cache under `key` instead of `METHOD:endpoint`.
    #[must_use]
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache.key = Some(key.into());
        self
    }

    /// Abort the call when `token` is cancelled.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Cache key of this call: the explicit override, else `METHOD:endpoint`.
    pub fn effective_cache_key(&self, endpoint: &str) -> String {
        match &self.cache.key {
            Some(key) => key.clone(),
            None => format!("{}:{}", self.method, endpoint),
        }
    }

    /// Whether the response cache participates in this call.
    pub fn uses_cache(&self) -> bool {
        self.cache.enabled && self.method.is_cacheable()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = RequestConfig::default();
        assert_eq!(config.method, HttpMethod::Get);
        assert!(config.retry);
        assert!(config.show_toast);
        assert!(config.show_loading);
        assert!(!config.cache.enabled);
        assert!(config.cancellation.is_none());
    }

    #[test]
    fn test_effective_cache_key() {
        let config = RequestConfig::get();
        assert_eq!(config.effective_cache_key("/widgets"), "GET:/widgets");

        let config = config.cache_key("widgets-page-1");
        assert_eq!(config.effective_cache_key("/widgets"), "widgets-page-1");
    }

    #[test]
    fn test_cache_only_applies_to_get() {
        assert!(RequestConfig::get().cached().uses_cache());
        assert!(!RequestConfig::get().uses_cache());
        assert!(!RequestConfig::new(HttpMethod::Post).cached().uses_cache());
    }

    #[test]
    fn test_builder_chain() {
        let config = RequestConfig::new(HttpMethod::Patch)
            .header("X-Trace", "abc")
            .body(json!({"name": "x"}))
            .timeout(Duration::from_millis(500))
            .without_retry()
            .show_toast(false)
            .cache_ttl(Duration::from_secs(5));

        assert_eq!(config.headers.get("X-Trace").map(String::as_str), Some("abc"));
        assert_eq!(config.body, Some(json!({"name": "x"})));
        assert_eq!(config.timeout, Some(Duration::from_millis(500)));
        assert!(!config.retry);
        assert!(!config.show_toast);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl, Some(Duration::from_secs(5)));
    }
}
