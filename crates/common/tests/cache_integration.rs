//! Integration tests for cache module
//!
//! Tests per-entry TTL expiry, proactive purging and shared access from
//! several threads

#![cfg(feature = "runtime")]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use courier_common::cache::TtlCache;
use courier_common::time::MockClock;

/// Verifies that a value is served until its TTL elapses and never after.
///
/// # Test Steps
/// 1. Insert a response body with a 300s TTL
/// 2. Read it repeatedly within the window
/// 3. Advance past the TTL and verify the stale value is not returned
#[test]
fn test_value_served_within_ttl_only() {
    let clock = MockClock::new();
    let cache: TtlCache<String, String, MockClock> = TtlCache::with_clock(clock.clone());
    let key = "GET:/widgets".to_string();

    cache.insert(key.clone(), r#"[{"id":1}]"#.to_string(), Duration::from_secs(300));

    for _ in 0..3 {
        clock.advance(Duration::from_millis(300));
        assert_eq!(cache.get(&key).as_deref(), Some(r#"[{"id":1}]"#));
    }

    clock.advance(Duration::from_secs(300));
    assert_eq!(cache.get(&key), None);
    assert!(cache.is_empty());
}

/// Verifies that a purge bounds memory for entries that are never read again.
#[test]
fn test_purge_reclaims_unread_entries() {
    let clock = MockClock::new();
    let cache: TtlCache<u32, Vec<u8>, MockClock> = TtlCache::with_clock(clock.clone());

    for i in 0..100 {
        let ttl = if i % 2 == 0 { Duration::from_secs(1) } else { Duration::from_secs(120) };
        cache.insert(i, vec![0; 16], ttl);
    }
    assert_eq!(cache.len(), 100);

    clock.advance(Duration::from_secs(60));
    assert_eq!(cache.purge_expired(), 50);
    assert_eq!(cache.len(), 50);

    let stats = cache.stats();
    assert_eq!(stats.expirations, 50);
    assert_eq!(stats.inserts, 100);
}

/// Verifies that a purging clone and a reading owner observe the same store.
#[test]
fn test_purge_from_another_thread() {
    let clock = MockClock::new();
    let cache: TtlCache<String, i32, MockClock> = TtlCache::with_clock(clock.clone());
    cache.insert("a".to_string(), 1, Duration::from_millis(10));
    cache.insert("b".to_string(), 2, Duration::from_secs(10));
    clock.advance_millis(10);

    let sweeper = cache.clone();
    let removed = thread::spawn(move || sweeper.purge_expired()).join().unwrap();

    assert_eq!(removed, 1);
    assert_eq!(cache.get(&"a".to_string()), None);
    assert_eq!(cache.get(&"b".to_string()), Some(2));
}

/// Concurrent writers and readers on the system clock.
#[test]
fn test_concurrent_readers_and_writers() {
    let cache: Arc<TtlCache<u64, u64>> = Arc::new(TtlCache::new());

    let writers: Vec<_> = (0..4u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..250 {
                    cache.insert(t * 1_000 + i, i, Duration::from_secs(60));
                }
            })
        })
        .collect();
    for handle in writers {
        handle.join().unwrap();
    }

    let readers: Vec<_> = (0..4u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || (0..250).filter(|i| cache.get(&(t * 1_000 + i)).is_some()).count())
        })
        .collect();
    let found: usize = readers.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(found, 1_000);
    assert_eq!(cache.stats().hits, 1_000);
}
