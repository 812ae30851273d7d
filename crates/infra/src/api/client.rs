//! API client façade
//!
//! [`ApiClient`] is the single boundary every call goes through. It owns the
//! response cache, the interceptor chain, the loading registry and the
//! session, and turns every outcome into a [`ResponseEnvelope`]. Failures are
//! data here: no public call returns `Err` for a failed request.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use courier_common::cache::{CacheStats, TtlCache};
use courier_common::resilience::{RetryConfig, RetryExecutor};
use courier_domain::{
    ClientConfig, CourierError, Credential, HttpMethod, NormalizedError, ResponseEnvelope,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use super::classifier::{classify, ClassifiedRetryPolicy};
use super::errors::ApiError;
use super::interceptors::InterceptorChain;
use super::loading::{LoadingChange, LoadingRegistry};
use super::notifier::{Notifier, TracingNotifier};
use super::request::RequestConfig;
use super::session::{CredentialStore, MemoryCredentialStore, SessionEvent, SessionState};
use super::sweeper::CacheSweeper;
use crate::http::{HttpClient, HttpRequest, HttpResponse};
use crate::observability::metrics::{RequestMetrics, RequestMetricsSnapshot};

const APPLICATION_JSON: &str = "application/json";

/// Resilient JSON API client
///
/// One instance per credential. Share it behind an `Arc`; every method takes
/// `&self`.
#[derive(Debug)]
pub struct ApiClient {
    config: ClientConfig,
    http: HttpClient,
    retry: RetryConfig,
    cache: TtlCache<String, Value>,
    interceptors: InterceptorChain,
    loading: LoadingRegistry,
    session: SessionState,
    notifier: Arc<dyn Notifier>,
    metrics: RequestMetrics,
    sweeper: Option<CacheSweeper>,
}

impl ApiClient {
    /// Client with an in-memory credential store and the tracing notifier.
    ///
    /// # Errors
    ///
    /// Returns `CourierError::Config` when `config` does not validate or the
    /// transport cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, CourierError> {
        Self::builder().config(config).build()
    }

    /// Start building a client with a custom store, notifier or transport.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run one call through cache, interceptors, retry and classification.
    ///
    /// Always resolves to an envelope; check `success`.
    #[instrument(skip(self, config), fields(method = %config.method))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        config: RequestConfig,
    ) -> ResponseEnvelope<T> {
        self.metrics.record_call();

        let cache_key = config.uses_cache().then(|| config.effective_cache_key(endpoint));
        let cache_ttl = config.cache.ttl.unwrap_or(self.config.default_cache_ttl);

        if let Some(key) = &cache_key {
            if let Some(cached) = self.cache.get(key) {
                self.metrics.record_cache_hit();
                debug!(key = %key, "Serving response from cache");
                return self.from_cache(cached, endpoint);
            }
            self.metrics.record_cache_miss();
        }

        let _loading = config.show_loading.then(|| self.loading.begin(endpoint));

        let config = self.interceptors.apply_request(config);
        let show_toast = config.show_toast;

        let outcome = match self.run_attempts(endpoint, &config).await {
            Ok(response) => {
                let cache = cache_key.map(|key| (key, cache_ttl));
                self.accept(endpoint, response, cache, show_toast)
            }
            Err(error) => Err(error),
        };

        match outcome {
            Ok(envelope) => {
                self.metrics.record_success();
                envelope
            }
            Err(error) => self.reject(endpoint, error, show_toast),
        }
    }

    /// GET `endpoint`; honours the per-call cache settings.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        config: RequestConfig,
    ) -> ResponseEnvelope<T> {
        self.execute(endpoint, config.method(HttpMethod::Get)).await
    }

    /// POST `body` as JSON. A body serializing to `null` (e.g. `()`) sends
    /// no body.
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: impl Serialize,
        config: RequestConfig,
    ) -> ResponseEnvelope<T> {
        self.send_with_body(endpoint, HttpMethod::Post, body, config).await
    }

    /// PUT `body` as JSON. A body serializing to `null` sends no body.
    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: impl Serialize,
        config: RequestConfig,
    ) -> ResponseEnvelope<T> {
        self.send_with_body(endpoint, HttpMethod::Put, body, config).await
    }

    /// PATCH `body` as JSON. A body serializing to `null` sends no body.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: impl Serialize,
        config: RequestConfig,
    ) -> ResponseEnvelope<T> {
        self.send_with_body(endpoint, HttpMethod::Patch, body, config).await
    }

    /// DELETE `endpoint`.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        config: RequestConfig,
    ) -> ResponseEnvelope<T> {
        self.execute(endpoint, config.method(HttpMethod::Delete)).await
    }

    /// Single GET to the configured liveness path, without retry or toasts.
    ///
    /// Retry is off so the result reflects the service as it is right now:
    /// one transient 5xx reports unhealthy. Callers that want the retry
    /// policy can `get` the health path themselves.
    pub async fn health_check(&self) -> ResponseEnvelope<Value> {
        let config = RequestConfig::get().without_retry().show_toast(false);
        let envelope = self.execute(&self.config.health_path, config).await;

        if envelope.success {
            info!("API is healthy");
        } else {
            warn!(error = ?envelope.error, "Health check failed");
        }
        envelope
    }

    /// Replace or clear the credential; `None` or a blank token clears it.
    ///
    /// # Errors
    ///
    /// Returns the credential store's error. The in-memory credential is
    /// updated even then.
    pub fn set_auth_token(&self, credential: Option<Credential>) -> Result<(), CourierError> {
        self.session.set(credential)
    }

    /// Current credential, if one is set.
    pub fn auth_token(&self) -> Option<Credential> {
        self.session.credential()
    }

    /// Receive credential changes and session expiries.
    pub fn subscribe_session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    /// Append a request interceptor; it runs after those already registered.
    pub fn add_request_interceptor<F>(&self, interceptor: F)
    where
        F: Fn(RequestConfig) -> RequestConfig + Send + Sync + 'static,
    {
        self.interceptors.add_request(interceptor);
    }

    /// Append a response interceptor; it sees the unwrapped payload.
    pub fn add_response_interceptor<F>(&self, interceptor: F)
    where
        F: Fn(ResponseEnvelope<Value>) -> ResponseEnvelope<Value> + Send + Sync + 'static,
    {
        self.interceptors.add_response(interceptor);
    }

    /// Append an error interceptor; it runs once per failed call.
    pub fn add_error_interceptor<F>(&self, interceptor: F)
    where
        F: Fn(NormalizedError) -> NormalizedError + Send + Sync + 'static,
    {
        self.interceptors.add_error(interceptor);
    }

    /// Whether a call on `endpoint` is in flight.
    pub fn is_loading(&self, endpoint: &str) -> bool {
        self.loading.is_loading(endpoint)
    }

    /// Copy of every recorded loading flag.
    pub fn loading_states(&self) -> HashMap<String, bool> {
        self.loading.snapshot()
    }

    /// Receive every loading-state change.
    pub fn subscribe_loading(&self) -> broadcast::Receiver<LoadingChange> {
        self.loading.subscribe()
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
        debug!("Response cache cleared");
    }

    /// Number of cached entries, expired ones included until swept.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Hit, miss and eviction counters of the response cache.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Point-in-time copy of the request counters.
    pub fn metrics(&self) -> RequestMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Whether expired cache entries are being swept in the background.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper.as_ref().is_some_and(CacheSweeper::is_running)
    }

    async fn send_with_body<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: impl Serialize,
        config: RequestConfig,
    ) -> ResponseEnvelope<T> {
        let mut config = config.method(method);
        match serde_json::to_value(body) {
            Ok(Value::Null) => {}
            Ok(value) => config.body = Some(value),
            Err(e) => {
                self.metrics.record_call();
                let error = classify(&ApiError::Config(format!("Unserializable body: {e}")), endpoint);
                return self.reject(endpoint, error, config.show_toast);
            }
        }
        self.execute(endpoint, config).await
    }

    /// Every transport attempt of one call, under the retry policy and the
    /// caller's cancellation token.
    async fn run_attempts(
        &self,
        endpoint: &str,
        config: &RequestConfig,
    ) -> Result<HttpResponse, NormalizedError> {
        let url = self.config.endpoint_url(endpoint);
        let timeout = config.timeout.unwrap_or(self.config.timeout);
        let cancel = config.cancellation.as_ref();

        let retry = if config.retry {
            self.retry.clone()
        } else {
            RetryConfig { max_retries: 0, ..self.retry.clone() }
        };
        let executor = RetryExecutor::new(retry, ClassifiedRetryPolicy);

        let attempt = || {
            let url = url.clone();
            async move {
                self.metrics.record_attempt();
                let headers = self.headers(&config.headers).map_err(|e| classify(&e, endpoint))?;
                let request = HttpRequest {
                    method: config.method,
                    url,
                    headers,
                    body: config.body.clone(),
                    timeout,
                };
                self.http.send(request, cancel).await.map_err(|e| classify(&e, endpoint))
            }
        };

        let cancelled = async {
            match cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => {
                debug!(endpoint, "Call cancelled by caller");
                Err(NormalizedError::cancelled())
            }
            outcome = executor.execute_with_outcome(attempt) => {
                self.metrics.record_retries(outcome.retries());
                outcome.into_result()
            }
        }
    }

    /// Unwrap a successful response, run the response interceptors, decode
    /// into `T` and populate the cache.
    fn accept<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: HttpResponse,
        cache: Option<(String, Duration)>,
        show_toast: bool,
    ) -> Result<ResponseEnvelope<T>, NormalizedError> {
        let (data, message) = unwrap_body(&response.body).map_err(|e| classify(&e, endpoint))?;

        let envelope = self
            .interceptors
            .apply_response(ResponseEnvelope::success(data.clone(), message, response.status));

        let envelope = envelope
            .try_map_data(serde_json::from_value::<T>)
            .map_err(|e| classify(&ApiError::Decode(e.to_string()), endpoint))?;

        if let (Some((key, ttl)), Some(data)) = (cache, data) {
            debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Caching response");
            self.cache.insert(key, data, ttl);
        }

        if show_toast {
            if let Some(message) = envelope.message.as_deref() {
                self.notifier.notify_success(message);
            }
        }

        debug!(endpoint, status = response.status, "Request succeeded");
        Ok(envelope)
    }

    /// Terminal failure: session side effect, error interceptors, toast.
    fn reject<T>(&self, endpoint: &str, error: NormalizedError, show_toast: bool) -> ResponseEnvelope<T> {
        if error.is_session_expired() {
            self.metrics.record_session_expiration();
            self.session.expire(endpoint);
        }

        let error = self.interceptors.apply_error(error);

        if show_toast && !matches!(error, NormalizedError::Cancelled { .. }) {
            self.notifier.notify_error(&error);
        }

        self.metrics.record_failure();
        warn!(endpoint, code = error.code(), status = error.status(), "Request failed");
        ResponseEnvelope::failure(&error)
    }

    fn from_cache<T: DeserializeOwned>(&self, cached: Value, endpoint: &str) -> ResponseEnvelope<T> {
        match serde_json::from_value::<T>(cached) {
            Ok(data) => {
                self.metrics.record_success();
                ResponseEnvelope::cached(data)
            }
            Err(e) => {
                self.metrics.record_failure();
                let error = classify(&ApiError::Decode(e.to_string()), endpoint);
                ResponseEnvelope::failure(&error)
            }
        }
    }

    /// JSON content negotiation, the bearer credential, then per-call
    /// headers on top.
    fn headers(&self, overrides: &BTreeMap<String, String>) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

        if let Some(credential) = self.session.credential() {
            let mut value = HeaderValue::from_str(&credential.bearer())
                .map_err(|_| ApiError::Config("Credential is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in overrides {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Config(format!("Invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Config(format!("Invalid value for header '{name}': {e}")))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

/// Split a success body into payload and message.
///
/// An empty body has no payload, and neither has an envelope whose `data`
/// is null. An object with a `data` field is an envelope and is unwrapped;
/// anything else is the payload itself. A string
/// `message` field is surfaced either way.
fn unwrap_body(body: &str) -> Result<(Option<Value>, Option<String>), ApiError> {
    if body.trim().is_empty() {
        return Ok((None, None));
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(format!("Invalid JSON body: {e}")))?;

    match value {
        Value::Object(mut map) => {
            let message = map.get("message").and_then(Value::as_str).map(str::to_string);
            match map.remove("data") {
                Some(Value::Null) => Ok((None, message)),
                Some(data) => Ok((Some(data), message)),
                None => Ok((Some(Value::Object(map)), message)),
            }
        }
        other => Ok((Some(other), None)),
    }
}

/// Builder for [`ApiClient`]
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    http: Option<HttpClient>,
    credential_store: Option<Arc<dyn CredentialStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    credential: Option<Credential>,
}

impl ApiClientBuilder {
    /// Client configuration; defaults apply when not set.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a preconfigured transport (custom user agent, default headers).
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Where the credential is persisted; in memory by default.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = Some(store);
        self
    }

    /// Where success and error toasts go; the log by default.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Initial credential. Replaces whatever the store held.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Build the client.
    ///
    /// Starts the cache sweeper when called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// - `CourierError::Config` when the configuration does not validate or
    ///   the transport cannot be built
    /// - the credential store's error when it cannot be read or written
    pub fn build(self) -> Result<ApiClient, CourierError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let retry = RetryConfig::builder()
            .max_retries(config.retry_attempts)
            .initial_delay(config.retry_initial_delay)
            .max_delay(config.retry_max_delay)
            .multiplier(2.0)
            .build()
            .map_err(|e| CourierError::Config(e.to_string()))?;

        let http = match self.http {
            Some(http) => http,
            None => HttpClient::new()?,
        };

        let store =
            self.credential_store.unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let session = SessionState::restore(store, config.loading_channel_capacity)?;
        if let Some(credential) = self.credential {
            session.set(Some(credential))?;
        }

        let cache = TtlCache::new();
        let sweeper = CacheSweeper::spawn(cache.clone(), config.cache_sweep_interval);

        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis() as u64,
            retry_attempts = config.retry_attempts,
            "API client ready"
        );

        Ok(ApiClient {
            loading: LoadingRegistry::new(config.loading_channel_capacity),
            notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            config,
            http,
            retry,
            cache,
            interceptors: InterceptorChain::new(),
            session,
            metrics: RequestMetrics::new(),
            sweeper,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(ClientConfig::with_base_url("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn test_unwrap_body_envelope() {
        let (data, message) = unwrap_body(r#"{"data": {"id": 1}, "message": "Created"}"#).unwrap();
        assert_eq!(data, Some(json!({"id": 1})));
        assert_eq!(message.as_deref(), Some("Created"));
    }

    #[test]
    fn test_unwrap_body_null_data_has_no_payload() {
        let (data, message) = unwrap_body(r#"{"data": null, "message": "Deleted"}"#).unwrap();
        assert!(data.is_none());
        assert_eq!(message.as_deref(), Some("Deleted"));
    }

    #[test]
    fn test_unwrap_body_bare_payload() {
        let (data, message) = unwrap_body(r#"{"status": "ok"}"#).unwrap();
        assert_eq!(data, Some(json!({"status": "ok"})));
        assert!(message.is_none());

        let (data, _) = unwrap_body("[1, 2, 3]").unwrap();
        assert_eq!(data, Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_unwrap_body_empty_and_invalid() {
        assert_eq!(unwrap_body("").unwrap(), (None, None));
        assert_eq!(unwrap_body("  \n").unwrap(), (None, None));
        assert!(matches!(unwrap_body("<html>"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_headers_defaults_and_overrides() {
        let client = client();
        client.set_auth_token(Some(Credential::new("tok"))).unwrap();

        let mut overrides = BTreeMap::new();
        overrides.insert("Accept".to_string(), "text/plain".to_string());
        overrides.insert("X-Request-Id".to_string(), "abc".to_string());

        let headers = client.headers(&overrides).unwrap();
        assert_eq!(headers[CONTENT_TYPE], APPLICATION_JSON);
        assert_eq!(headers[ACCEPT], "text/plain");
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers["x-request-id"], "abc");
    }

    #[test]
    fn test_headers_without_credential() {
        let client = client();
        let headers = client.headers(&BTreeMap::new()).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_header_name_is_config_error() {
        let client = client();
        let mut overrides = BTreeMap::new();
        overrides.insert("bad header".to_string(), "x".to_string());
        assert!(matches!(client.headers(&overrides), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = ApiClient::new(ClientConfig::with_base_url("not a url"));
        assert!(matches!(result, Err(CourierError::Config(_))));
    }

    #[test]
    fn test_builder_outside_runtime_has_no_sweeper() {
        let client = client();
        assert!(!client.is_sweeping());
    }

    #[tokio::test]
    async fn test_builder_inside_runtime_starts_sweeper() {
        let client = client();
        assert!(client.is_sweeping());
    }

    #[test]
    fn test_builder_credential_is_persisted() {
        let store = Arc::new(MemoryCredentialStore::new());
        let client = ApiClient::builder()
            .config(ClientConfig::with_base_url("http://127.0.0.1:9"))
            .credential_store(store.clone())
            .credential(Credential::new("abc"))
            .build()
            .unwrap();

        assert_eq!(client.auth_token(), Some(Credential::new("abc")));
        assert_eq!(store.load().unwrap(), Some(Credential::new("abc")));
    }

    #[test]
    fn test_builder_restores_stored_credential() {
        let store = Arc::new(MemoryCredentialStore::with_credential(Credential::new("saved")));
        let client = ApiClient::builder()
            .config(ClientConfig::with_base_url("http://127.0.0.1:9"))
            .credential_store(store)
            .build()
            .unwrap();

        assert_eq!(client.auth_token(), Some(Credential::new("saved")));
    }
}
