//! Loading-state registry
//!
//! Tracks which call identifiers are in flight and broadcasts every change,
//! so UI collaborators can subscribe instead of polling.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::trace;

/// One loading-state mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingChange {
    pub id: String,
    pub loading: bool,
}

/// Shared map of identifier -> loading flag with change notifications
#[derive(Debug, Clone)]
pub struct LoadingRegistry {
    states: Arc<RwLock<HashMap<String, bool>>>,
    tx: broadcast::Sender<LoadingChange>,
}

impl LoadingRegistry {
    /// Create a registry whose subscribers buffer up to `capacity` changes.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { states: Arc::new(RwLock::new(HashMap::new())), tx }
    }

    /// Record `loading` for `id` and notify subscribers.
    pub fn set(&self, id: &str, loading: bool) {
        self.states.write().insert(id.to_string(), loading);
        trace!(id, loading, "Loading state changed");
        // No subscribers is fine; the change is still recorded.
        let _ = self.tx.send(LoadingChange { id: id.to_string(), loading });
    }

    /// `false` for identifiers never seen.
    pub fn is_loading(&self, id: &str) -> bool {
        self.states.read().get(id).copied().unwrap_or(false)
    }

    /// Copy of every recorded state
    pub fn snapshot(&self) -> HashMap<String, bool> {
        self.states.read().clone()
    }

    /// Receive every change recorded after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LoadingChange> {
        self.tx.subscribe()
    }

    /// Mark `id` as loading until the returned guard is dropped.
    #[must_use = "the loading state is cleared when the guard is dropped"]
    pub fn begin(&self, id: &str) -> LoadingGuard {
        self.set(id, true);
        LoadingGuard { registry: self.clone(), id: id.to_string() }
    }
}

impl Default for LoadingRegistry {
    fn default() -> Self {
        Self::new(courier_domain::constants::DEFAULT_LOADING_CHANNEL_CAPACITY)
    }
}

/// Clears its identifier's loading flag on drop, including when the owning
/// future is dropped mid-flight.
#[derive(Debug)]
pub struct LoadingGuard {
    registry: LoadingRegistry,
    id: String,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.registry.set(&self.id, false);
    }
}
