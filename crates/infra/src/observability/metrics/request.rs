//! Request-level counters
//!
//! One [`RequestMetrics`] instance is owned by each client. Counters are
//! independent, so relaxed ordering is enough; a snapshot is not an atomic
//! view across counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for calls made through one client
#[derive(Debug, Default)]
pub struct RequestMetrics {
    calls: AtomicU64,
    attempts: AtomicU64,
    retries: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    session_expirations: AtomicU64,
}

/// Point-in-time copy of [`RequestMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestMetricsSnapshot {
    pub calls: u64,
    /// Transport attempts, including retries
    pub attempts: u64,
    pub retries: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub successes: u64,
    pub failures: u64,
    pub session_expirations: u64,
}

impl RequestMetricsSnapshot {
    /// Fraction of cache lookups that hit, 0.0 when nothing was looked up.
    pub fn cache_hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retries(&self, retries: u32) {
        if retries > 0 {
            self.retries.fetch_add(u64::from(retries), Ordering::Relaxed);
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_expiration(&self) {
        self.session_expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RequestMetricsSnapshot {
        RequestMetricsSnapshot {
            calls: self.calls.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            session_expirations: self.session_expirations.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = RequestMetrics::new();
        metrics.record_call();
        metrics.record_attempt();
        metrics.record_attempt();
        metrics.record_retries(1);
        metrics.record_retries(0);
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.calls, 1);
        assert_eq!(snapshot.attempts, 2);
        assert_eq!(snapshot.retries, 1);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.successes, 0);
    }

    #[test]
    fn test_cache_hit_rate() {
        let metrics = RequestMetrics::new();
        assert!(metrics.snapshot().cache_hit_rate().abs() < f64::EPSILON);

        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        assert!((metrics.snapshot().cache_hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_concurrent_recording() {
        let metrics = Arc::new(RequestMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.record_attempt();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().attempts, 8000);
    }
}
