//! Modular common utilities shared across Courier crates.
//!
//! Nothing in this crate knows about HTTP. The building blocks here are
//! generic over keys, values and error types so the request layer in
//! `courier-infra` can compose them.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: clock abstraction
//! - `runtime`: async infrastructure (TTL cache, retry with backoff)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::{CacheStats, TtlCache};
#[cfg(feature = "runtime")]
pub use resilience::{
    retry, retry_with_policy, RetryConfig, RetryConfigBuilder, RetryDecision, RetryError,
    RetryExecutor, RetryOutcome, RetryPolicy,
};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
