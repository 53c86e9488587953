//! Per-key debounce owned by whoever schedules the work.
//!
//! Scheduling under a key cancels whatever is pending (or still running) for
//! that key, so a burst of filter changes collapses into the last one.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

struct Pending {
    id: u64,
    handle: JoinHandle<()>,
}

#[derive(Clone, Default)]
pub struct ScopedDebounce {
    pending: Arc<Mutex<HashMap<String, Pending>>>,
    next_id: Arc<AtomicU64>,
}

impl ScopedDebounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay` unless `key` is scheduled again first.
    pub fn schedule<F>(&self, key: &str, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);
        let owned_key = key.to_string();

        let mut map = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
            let mut map = pending.lock().unwrap_or_else(|e| e.into_inner());
            if map.get(&owned_key).is_some_and(|p| p.id == id) {
                map.remove(&owned_key);
            }
        });

        if let Some(previous) = map.insert(key.to_string(), Pending { id, handle }) {
            previous.handle.abort();
            debug!(key, "Debounced task superseded");
        }
    }

    #[cfg(test)]
    fn is_pending(&self, key: &str) -> bool {
        let map = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        map.contains_key(key)
    }
}
