//! Sync queue storage and management.
//!
//! The queue is the only writer of its storage key. Every mutation rewrites
//! the full snapshot while the queue lock is held, so what is on disk always
//! matches what callers can observe.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::item::{ItemKind, QueueItem};
use crate::storage::DurableStore;

const QUEUE_KEY: &str = "sync_queue";

/// Ordered queue of pending offline actions.
pub struct SyncQueue {
    store: Arc<DurableStore>,
    items: Mutex<Vec<QueueItem>>,
}

impl SyncQueue {
    /// Load the queue persisted in `store`.
    ///
    /// Absent or malformed data yields an empty queue.
    #[must_use]
    pub fn load(store: Arc<DurableStore>) -> Self {
        let stored: Vec<QueueItem> = store.read(QUEUE_KEY).unwrap_or_default();

        let mut seen = HashSet::new();
        let items: Vec<QueueItem> = stored
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();

        tracing::debug!(pending = items.len(), "loaded sync queue");

        Self {
            store,
            items: Mutex::new(items),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<QueueItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, items: &[QueueItem]) {
        if !self.store.write(QUEUE_KEY, items) {
            tracing::warn!(
                pending = items.len(),
                "sync queue not persisted, keeping in-memory state"
            );
        }
    }

    /// Append a new item and persist before returning its id.
    pub fn enqueue(&self, kind: ItemKind, payload: Value) -> String {
        let item = QueueItem::new(kind, payload);
        let id = item.id.clone();

        let mut items = self.lock();
        items.push(item);
        self.persist(&items);

        tracing::info!(%id, kind = kind.as_str(), pending = items.len(), "queued item");
        id
    }

    /// Remove the item with `id`. Returns whether anything was removed.
    pub fn remove(&self, id: &str) -> bool {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|item| item.id != id);

        if items.len() == before {
            return false;
        }

        self.persist(&items);
        true
    }

    /// Record a failed attempt for `id`, returning the new retry count.
    ///
    /// Items removed in the meantime are ignored.
    pub fn increment_retry(&self, id: &str) -> Option<u32> {
        let mut items = self.lock();
        let item = items.iter_mut().find(|item| item.id == id)?;
        item.retry_count = item.retry_count.saturating_add(1);
        let retries = item.retry_count;

        self.persist(&items);
        Some(retries)
    }

    /// Remove every item. Returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut items = self.lock();
        let count = items.len();
        items.clear();
        self.persist(&items);
        count
    }

    /// Number of pending items.
    #[must_use]
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    /// Check if there are no pending items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Check whether `id` is still queued.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lock().iter().any(|item| item.id == id)
    }

    /// Get a copy of a single item.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<QueueItem> {
        self.lock().iter().find(|item| item.id == id).cloned()
    }

    /// Copy of the queue in FIFO order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<QueueItem> {
        self.lock().clone()
    }

    /// Get queue statistics.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        let items = self.lock();

        QueueStats {
            pending: items.len(),
            retrying: items.iter().filter(|item| item.retry_count > 0).count(),
            oldest_pending: items.iter().map(|item| item.created_at).min(),
        }
    }
}

/// Queue statistics.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    /// Number of pending items
    pub pending: usize,
    /// Items that have failed at least once
    pub retrying: usize,
    /// Oldest pending item timestamp
    pub oldest_pending: Option<DateTime<Utc>>,
}
