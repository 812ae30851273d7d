//! Metrics collection modules
//!
//! Thread-safe counters for the request layer.

pub mod request;

pub use request::{RequestMetrics, RequestMetricsSnapshot};
