//! TTL response cache
//!
//! A keyed store where every entry carries its own time-to-live. Reads never
//! refresh an entry; an entry whose age has reached its TTL is treated as
//! absent and removed on the read that observes it. [`TtlCache::purge_expired`]
//! removes every expired entry at once and is what a periodic sweeper calls.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use courier_common::cache::TtlCache;
//!
//! let cache: TtlCache<String, u32> = TtlCache::new();
//! cache.insert("GET:/widgets".to_string(), 7, Duration::from_secs(60));
//! assert_eq!(cache.get(&"GET:/widgets".to_string()), Some(7));
//! ```
//!
//! Time is read through [`crate::time::Clock`], so tests can expire entries
//! deterministically:
//!
//! ```
//! use std::time::Duration;
//!
//! use courier_common::cache::TtlCache;
//! use courier_common::time::MockClock;
//!
//! let clock = MockClock::new();
//! let cache: TtlCache<&str, u32, MockClock> = TtlCache::with_clock(clock.clone());
//! cache.insert("k", 1, Duration::from_millis(100));
//!
//! clock.advance_millis(100);
//! assert_eq!(cache.get(&"k"), None);
//! ```

pub mod core;
pub mod stats;

pub use self::core::TtlCache;
pub use self::stats::CacheStats;
