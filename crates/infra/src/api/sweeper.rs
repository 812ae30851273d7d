//! Periodic purge of expired cache entries
//!
//! Entries that are never read again would otherwise stay in memory until
//! their key is reused. The sweeper runs [`TtlCache::purge_expired`] on a
//! fixed interval for as long as it is alive.

use std::hash::Hash;
use std::time::Duration;

use courier_common::cache::TtlCache;
use courier_common::time::Clock;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Background sweep task bound to a cache
///
/// Dropping the sweeper stops the task.
#[derive(Debug)]
pub struct CacheSweeper {
    cancellation_token: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl CacheSweeper {
    /// Start sweeping `cache` every `interval` on the current tokio runtime.
    ///
    /// Returns `None` when called outside a runtime; the cache then relies
    /// on expiry at read time alone.
    pub fn spawn<K, V, C>(cache: TtlCache<K, V, C>, interval: Duration) -> Option<Self>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        C: Clock + Clone,
    {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                debug!("No tokio runtime; cache sweeper not started");
                return None;
            }
        };

        let cancellation_token = CancellationToken::new();
        let cancel = cancellation_token.clone();
        let task = handle.spawn(Self::sweep_loop(cache, interval, cancel));

        info!(interval_ms = interval.as_millis() as u64, "Cache sweeper started");

        Some(Self { cancellation_token, task_handle: Some(task) })
    }

    /// Whether the sweep task is still alive.
    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the task and wait for it to finish.
    pub async fn stop(mut self) {
        self.cancellation_token.cancel();
        if let Some(task) = self.task_handle.take() {
            let _ = task.await;
        }
        debug!("Cache sweeper stopped");
    }

    async fn sweep_loop<K, V, C>(cache: TtlCache<K, V, C>, interval: Duration, cancel: CancellationToken)
    where
        K: Eq + Hash + Clone,
        V: Clone,
        C: Clock,
    {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Sweep loop cancelled");
                    break;
                }
                () = tokio::time::sleep(interval) => {
                    let removed = cache.purge_expired();
                    if removed > 0 {
                        debug!(removed, remaining = cache.len(), "Purged expired cache entries");
                    }
                }
            }
        }
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}
