//! Observability: tracing setup and request metrics
//!
//! Library code only emits `tracing` events. Hosts that do not install their
//! own subscriber can call [`init_tracing`] once at startup.

pub mod metrics;

use courier_domain::{CourierError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

pub use metrics::{RequestMetrics, RequestMetricsSnapshot};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-line
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Install a global subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` (e.g. `"info,courier_infra=debug"`).
///
/// # Errors
///
/// Returns `CourierError::Config` when `default_filter` does not parse, and
/// `CourierError::Internal` when a global subscriber is already installed.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| CourierError::Config(format!("Invalid log filter '{default_filter}': {e}")))?,
    };

    let registry = Registry::default().with(filter);
    let installed = match format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    installed.map_err(|e| CourierError::Internal(format!("Tracing already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        // Another test binary or test may have installed one first; either
        // way at most one of these calls can succeed.
        let first = init_tracing("warn", LogFormat::Json);
        let second = init_tracing("warn", LogFormat::Pretty);
        assert!(first.is_err() || second.is_err());
        assert!(matches!(second, Err(CourierError::Internal(_))));
    }
}
