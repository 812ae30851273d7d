//! Interceptor pipeline
//!
//! Three append-only, ordered registries. Interceptors are plain synchronous
//! functions: each receives the output of the previous one and returns the
//! value handed to the next. They shape data; they cannot suspend or stop a
//! call.

use std::sync::Arc;

use courier_domain::{NormalizedError, ResponseEnvelope};
use parking_lot::RwLock;
use serde_json::Value;

use super::request::RequestConfig;

/// Rewrites the per-call configuration before the transport call is built.
pub type RequestInterceptor = Arc<dyn Fn(RequestConfig) -> RequestConfig + Send + Sync>;
/// Rewrites a successful envelope before its payload is decoded.
pub type ResponseInterceptor =
    Arc<dyn Fn(ResponseEnvelope<Value>) -> ResponseEnvelope<Value> + Send + Sync>;
/// Rewrites a classified failure before it is reported.
pub type ErrorInterceptor = Arc<dyn Fn(NormalizedError) -> NormalizedError + Send + Sync>;

/// Registries for request, response and error interceptors
#[derive(Default)]
pub struct InterceptorChain {
    request: RwLock<Vec<RequestInterceptor>>,
    response: RwLock<Vec<ResponseInterceptor>>,
    error: RwLock<Vec<ErrorInterceptor>>,
}

impl InterceptorChain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request interceptor.
    pub fn add_request<F>(&self, interceptor: F)
    where
        F: Fn(RequestConfig) -> RequestConfig + Send + Sync + 'static,
    {
        self.request.write().push(Arc::new(interceptor));
    }

    /// Append a response interceptor.
    pub fn add_response<F>(&self, interceptor: F)
    where
        F: Fn(ResponseEnvelope<Value>) -> ResponseEnvelope<Value> + Send + Sync + 'static,
    {
        self.response.write().push(Arc::new(interceptor));
    }

    /// Append an error interceptor.
    pub fn add_error<F>(&self, interceptor: F)
    where
        F: Fn(NormalizedError) -> NormalizedError + Send + Sync + 'static,
    {
        self.error.write().push(Arc::new(interceptor));
    }

    /// Fold `config` through the request interceptors in registration order.
    pub fn apply_request(&self, config: RequestConfig) -> RequestConfig {
        fold(&self.request, config)
    }

    /// Fold `envelope` through the response interceptors in registration order.
    pub fn apply_response(&self, envelope: ResponseEnvelope<Value>) -> ResponseEnvelope<Value> {
        fold(&self.response, envelope)
    }

    /// Fold `error` through the error interceptors in registration order.
    pub fn apply_error(&self, error: NormalizedError) -> NormalizedError {
        fold(&self.error, error)
    }

    /// Number of registered request interceptors.
    pub fn request_count(&self) -> usize {
        self.request.read().len()
    }

    /// Number of registered response interceptors.
    pub fn response_count(&self) -> usize {
        self.response.read().len()
    }

    /// Number of registered error interceptors.
    pub fn error_count(&self) -> usize {
        self.error.read().len()
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("request", &self.request_count())
            .field("response", &self.response_count())
            .field("error", &self.error_count())
            .finish()
    }
}

/// Run `value` through a snapshot of the registry. The lock is released
/// before any interceptor runs, so an interceptor may register another one;
/// the new one applies from the next call on.
fn fold<T, I>(registry: &RwLock<Vec<Arc<I>>>, value: T) -> T
where
    I: Fn(T) -> T + ?Sized,
{
    let snapshot: Vec<Arc<I>> = registry.read().clone();
    snapshot.iter().fold(value, |acc, interceptor| (interceptor.as_ref())(acc))
}
