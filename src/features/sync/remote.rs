//! Stand-in remote target.
//!
//! The field app has no backend yet; submissions are acknowledged after a
//! configurable delay, and selected kinds can be rejected to exercise the
//! retry path.

use std::time::Duration;

use async_trait::async_trait;

use super::engine::RemoteTarget;
use super::item::{ItemKind, QueueItem};
use crate::config::RemoteConfig;
use crate::error::FieldSyncError;

/// Remote target that acknowledges items after a fixed latency.
#[derive(Debug, Clone)]
pub struct SimulatedRemote {
    latency: Duration,
    fail_kinds: Vec<ItemKind>,
}

impl SimulatedRemote {
    #[must_use]
    pub const fn new(latency: Duration, fail_kinds: Vec<ItemKind>) -> Self {
        Self {
            latency,
            fail_kinds,
        }
    }

    #[must_use]
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(
            Duration::from_millis(config.latency_ms),
            config.fail_kinds.clone(),
        )
    }
}

#[async_trait]
impl RemoteTarget for SimulatedRemote {
    async fn submit(&self, item: &QueueItem) -> Result<(), FieldSyncError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.fail_kinds.contains(&item.kind) {
            return Err(FieldSyncError::Submission(format!(
                "remote rejected {} {}",
                item.kind.as_str(),
                item.id
            )));
        }

        tracing::info!(id = %item.id, kind = item.kind.as_str(), "remote accepted item");
        Ok(())
    }
}
