//! Sync engine for replaying queued items.
//!
//! Drains the queue against a [`RemoteTarget`] one item at a time, in FIFO
//! order, counting successes and failures and recording the last successful
//! sync time.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::watch;

use super::connectivity::{Connectivity, ConnectivityMonitor, SubscriptionId};
use super::item::QueueItem;
use super::queue::SyncQueue;
use super::status::{Notice, SyncStatus};
use crate::error::FieldSyncError;
use crate::storage::DurableStore;

const LAST_SYNC_KEY: &str = "last_sync";

/// Where queued items are delivered.
#[async_trait]
pub trait RemoteTarget: Send + Sync {
    /// Deliver one item. `Ok` means the remote acknowledged it.
    async fn submit(&self, item: &QueueItem) -> Result<(), FieldSyncError>;
}

/// Why a drain did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Offline,
    Empty,
    AlreadyRunning,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Offline => "offline",
            Self::Empty => "nothing queued",
            Self::AlreadyRunning => "already running",
        };
        write!(f, "{s}")
    }
}

/// Outcome of one drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    /// Items acknowledged and removed
    pub succeeded: usize,
    /// Items that failed and stay queued
    pub failed: usize,
    /// Items not attempted: the whole queue when the drain was skipped,
    /// otherwise items removed by someone else mid-drain
    pub skipped: usize,
    /// Set when the drain did not run at all
    pub skip_reason: Option<SkipReason>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncResult {
    fn started(started_at: DateTime<Utc>) -> Self {
        Self {
            succeeded: 0,
            failed: 0,
            skipped: 0,
            skip_reason: None,
            started_at,
            finished_at: started_at,
        }
    }

    fn skipped(reason: SkipReason, pending: usize, at: DateTime<Utc>) -> Self {
        Self {
            skipped: pending,
            skip_reason: Some(reason),
            ..Self::started(at)
        }
    }

    /// Whether the drain was skipped by a precondition.
    #[must_use]
    pub const fn was_skipped(&self) -> bool {
        self.skip_reason.is_some()
    }

    /// Check if every attempted item succeeded.
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Get total items accounted for.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

/// Clears the running flag when dropped, whatever path the drain took.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates draining the queue when connectivity allows.
pub struct SyncEngine {
    queue: Arc<SyncQueue>,
    monitor: Arc<ConnectivityMonitor>,
    store: Arc<DurableStore>,
    running: AtomicBool,
    last_sync: Mutex<Option<DateTime<Utc>>>,
    results: watch::Sender<Option<SyncResult>>,
}

impl SyncEngine {
    /// Create an engine, restoring the persisted last sync time.
    #[must_use]
    pub fn new(
        queue: Arc<SyncQueue>,
        monitor: Arc<ConnectivityMonitor>,
        store: Arc<DurableStore>,
    ) -> Self {
        let last_sync = store
            .read_raw(LAST_SYNC_KEY)
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|t| t.with_timezone(&Utc));
        let (results, _) = watch::channel(None);

        Self {
            queue,
            monitor,
            store,
            running: AtomicBool::new(false),
            last_sync: Mutex::new(last_sync),
            results,
        }
    }

    #[must_use]
    pub const fn queue(&self) -> &Arc<SyncQueue> {
        &self.queue
    }

    #[must_use]
    pub const fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.size()
    }

    /// Whether queued items and the last sync time outlive this process.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.store.is_persistent()
    }

    /// True while a drain is in progress.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Completion time of the last drain that delivered at least one item.
    #[must_use]
    pub fn last_sync_time(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Everything a status display needs, read at once.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            online: self.is_online(),
            pending: self.pending_count(),
            syncing: self.is_syncing(),
            last_sync: self.last_sync_time(),
            persistent: self.is_persistent(),
        }
    }

    /// Watch the result of every drain, including skipped ones.
    #[must_use]
    pub fn subscribe_results(&self) -> watch::Receiver<Option<SyncResult>> {
        self.results.subscribe()
    }

    /// Submit every queued item once.
    ///
    /// Skipped when offline, when the queue is empty, or while another drain
    /// is running. Items enqueued after the drain starts wait for the next one.
    pub async fn drain(&self, target: &dyn RemoteTarget) -> SyncResult {
        let started_at = Utc::now();

        if !self.monitor.is_online() {
            return self.finish_skipped(SkipReason::Offline, started_at);
        }
        if self.queue.is_empty() {
            return self.finish_skipped(SkipReason::Empty, started_at);
        }
        let Some(_running) = RunningGuard::acquire(&self.running) else {
            return self.finish_skipped(SkipReason::AlreadyRunning, started_at);
        };

        let batch = self.queue.snapshot();
        tracing::info!(items = batch.len(), "sync started");

        let mut result = SyncResult::started(started_at);

        for item in batch {
            if !self.queue.contains(&item.id) {
                result.skipped += 1;
                continue;
            }

            match AssertUnwindSafe(target.submit(&item)).catch_unwind().await {
                Ok(Ok(())) => {
                    self.queue.remove(&item.id);
                    result.succeeded += 1;
                    tracing::debug!(id = %item.id, kind = item.kind.as_str(), "item synced");
                }
                Ok(Err(e)) => {
                    let retries = self.queue.increment_retry(&item.id);
                    result.failed += 1;
                    tracing::warn!(id = %item.id, kind = item.kind.as_str(), ?retries, error = %e, "item sync failed");
                }
                Err(_) => {
                    let retries = self.queue.increment_retry(&item.id);
                    result.failed += 1;
                    tracing::error!(id = %item.id, kind = item.kind.as_str(), ?retries, "remote target panicked");
                }
            }
        }

        result.finished_at = Utc::now();
        if result.succeeded > 0 {
            self.record_sync(result.finished_at);
        }

        tracing::info!(
            succeeded = result.succeeded,
            failed = result.failed,
            skipped = result.skipped,
            "sync finished"
        );
        self.results.send_replace(Some(result.clone()));
        result
    }

    /// User-initiated "sync now": same guard as automatic drains, plus a
    /// notice suitable for a toast or banner.
    pub async fn sync_now(&self, target: &dyn RemoteTarget) -> (SyncResult, Notice) {
        let result = self.drain(target).await;
        let notice = Notice::for_manual_sync(&result);
        (result, notice)
    }

    /// Drain automatically whenever the network comes back while items are
    /// waiting.
    ///
    /// # Errors
    ///
    /// Returns an error when called outside a tokio runtime.
    pub fn attach(
        self: &Arc<Self>,
        target: Arc<dyn RemoteTarget>,
    ) -> Result<SubscriptionId, FieldSyncError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| {
            FieldSyncError::Config(format!("auto sync needs a tokio runtime: {e}"))
        })?;
        let engine: Weak<Self> = Arc::downgrade(self);

        Ok(self.monitor.subscribe(move |state| {
            if state != Connectivity::Online {
                return;
            }
            let Some(engine) = engine.upgrade() else {
                return;
            };
            if engine.queue.is_empty() {
                return;
            }

            tracing::debug!(pending = engine.pending_count(), "back online, scheduling sync");
            let target = Arc::clone(&target);
            handle.spawn(async move {
                engine.drain(target.as_ref()).await;
            });
        }))
    }

    fn record_sync(&self, at: DateTime<Utc>) {
        *self.last_sync.lock().unwrap_or_else(PoisonError::into_inner) = Some(at);
        self.store.write_raw(LAST_SYNC_KEY, &at.to_rfc3339());
    }

    fn finish_skipped(&self, reason: SkipReason, at: DateTime<Utc>) -> SyncResult {
        tracing::debug!(%reason, "sync skipped");
        let result = SyncResult::skipped(reason, self.queue.size(), at);
        self.results.send_replace(Some(result.clone()));
        result
    }
}
