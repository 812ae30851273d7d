//! Resilient API request layer
//!
//! [`ApiClient`] is the entry point. The other modules are its parts:
//!
//! - [`classifier`]: raw attempt failures to [`NormalizedError`](courier_domain::NormalizedError)
//! - [`interceptors`]: request, response and error pipelines
//! - [`loading`]: per-endpoint loading flags with change broadcasts
//! - [`session`]: credential ownership, persistence and expiry events
//! - [`sweeper`]: periodic eviction of expired cache entries

pub mod classifier;
pub mod client;
pub mod errors;
pub mod interceptors;
pub mod loading;
pub mod notifier;
pub mod request;
pub mod session;
pub mod sweeper;

pub use classifier::{classify, ClassifiedRetryPolicy};
pub use client::{ApiClient, ApiClientBuilder};
pub use errors::{ApiError, ErrorBody};
pub use interceptors::{ErrorInterceptor, InterceptorChain, RequestInterceptor, ResponseInterceptor};
pub use loading::{LoadingChange, LoadingGuard, LoadingRegistry};
pub use notifier::{Notifier, TracingNotifier};
pub use request::{CacheOptions, RequestConfig};
pub use session::{
    CredentialStore, FileCredentialStore, KeychainCredentialStore, MemoryCredentialStore,
    SessionEvent, SessionState,
};
pub use sweeper::CacheSweeper;
