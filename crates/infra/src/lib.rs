//! # Courier Infrastructure
//!
//! The impure half of the request layer: the reqwest transport, the
//! [`api::ApiClient`] façade with its classifier, interceptors, loading-state
//! registry and session handling, configuration loading and tracing setup.
//!
//! ## Architecture
//! - Pure data types live in `courier-domain`
//! - Generic building blocks (TTL cache, retry executor) live in
//!   `courier-common`
//! - Everything that touches the network, the filesystem, the keychain or a
//!   runtime lives here

pub mod api;
pub mod config;
pub mod http;
pub mod observability;

pub use api::{ApiClient, ApiClientBuilder, CacheOptions, RequestConfig};
pub use http::HttpClient;
