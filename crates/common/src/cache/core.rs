//! Core TTL cache implementation

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::stats::{CacheStats, MetricsCollector};
use crate::time::{Clock, SystemClock};

/// Entry stored with its own lifetime
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

/// Thread-safe keyed store with per-entry expiry
///
/// Clones share storage and counters, so a clone can be handed to a
/// background sweeper while the owner keeps reading and writing.
///
/// # Type Parameters
/// - `K`: Key type (must be `Eq + Hash + Clone`)
/// - `V`: Value type (must be `Clone`)
/// - `C`: Clock type for time-based operations (defaults to `SystemClock`)
pub struct TtlCache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache reading the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Create an empty cache reading time from `clock`
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            metrics: MetricsCollector::default(),
            clock,
        }
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry { value, inserted_at: self.clock.now(), ttl };
        self.entries.write().insert(key, entry);
        self.metrics.record_insert();
    }

    /// Live value for `key`.
    ///
    /// An entry whose age has reached its TTL is removed and reported as
    /// absent. A hit does not extend the entry's lifetime.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => {
                    self.metrics.record_miss();
                    return None;
                }
                Some(entry) if !entry.is_expired(now) => {
                    self.metrics.record_hit();
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock: a concurrent insert may have
        // replaced the expired entry in between.
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.metrics.record_hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                self.metrics.record_expirations(1);
                self.metrics.record_miss();
                None
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    /// `true` when `key` holds a live entry. Does not count as a read.
    pub fn contains_key(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.entries.read().get(key).is_some_and(|entry| !entry.is_expired(now))
    }

    /// Remove the entry for `key`, returning its value when it was live.
    pub fn remove(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        self.entries.write().remove(key).filter(|entry| !entry.is_expired(now)).map(|e| e.value)
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        self.entries.write().clear();
        self.metrics.reset();
    }

    /// Number of stored entries, including expired ones not yet removed
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every expired entry.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        drop(entries);

        if removed > 0 {
            self.metrics.record_expirations(removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len())
    }
}

impl<K, V, C> Clone for TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<K, V, C> std::fmt::Debug for TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").field("len", &self.len()).finish_non_exhaustive()
    }
}
