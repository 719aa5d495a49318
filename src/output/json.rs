//! JSON output formatting for fieldsync.
//!
//! This module provides functions for formatting queue data as JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::error::FieldSyncError;
use crate::features::sync::{Notice, QueueItem, SyncResult, SyncStatus};

/// Format queued items as JSON
///
/// # Errors
///
/// Returns `FieldSyncError::Parse` if JSON serialization fails.
pub fn format_items_json(items: &[QueueItem], total: usize) -> Result<String, FieldSyncError> {
    let output = json!({
        "count": items.len(),
        "total": total,
        "items": items
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format sync status as JSON
///
/// # Errors
///
/// Returns `FieldSyncError::Parse` if JSON serialization fails.
pub fn format_status_json(
    status: &SyncStatus,
    oldest_pending: Option<DateTime<Utc>>,
) -> Result<String, FieldSyncError> {
    let output = json!({
        "online": status.online,
        "pending": status.pending,
        "syncing": status.syncing,
        "last_sync": status.last_sync.map(|t| t.to_rfc3339()),
        "oldest_pending": oldest_pending.map(|t| t.to_rfc3339()),
        "indicator": status.indicator().compact_label(),
        "persistent": status.persistent,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a manual sync outcome as JSON
///
/// # Errors
///
/// Returns `FieldSyncError::Parse` if JSON serialization fails.
pub fn format_sync_json(result: &SyncResult, notice: &Notice) -> Result<String, FieldSyncError> {
    let output = json!({
        "succeeded": result.succeeded,
        "failed": result.failed,
        "skipped": result.skipped,
        "skip_reason": result.skip_reason,
        "total": result.total(),
        "notice": notice,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `FieldSyncError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, FieldSyncError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sync::{ItemKind, SkipReason};

    #[test]
    fn test_format_items_json() {
        let items = vec![QueueItem::new(
            ItemKind::UnitStateUpdate,
            json!({"unitId": "U-3", "status": "in_progress"}),
        )];

        let output = format_items_json(&items, 4).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["count"], 1);
        assert_eq!(value["total"], 4);
        assert_eq!(value["items"][0]["kind"], "unit_state_update");
        assert_eq!(value["items"][0]["retryCount"], 0);
    }

    #[test]
    fn test_format_status_json() {
        let status = SyncStatus {
            online: false,
            pending: 2,
            syncing: false,
            last_sync: None,
            persistent: false,
        };

        let value: serde_json::Value =
            serde_json::from_str(&format_status_json(&status, None).unwrap()).unwrap();

        assert_eq!(value["online"], false);
        assert_eq!(value["pending"], 2);
        assert_eq!(value["indicator"], "Offline");
        assert!(value["last_sync"].is_null());
        assert_eq!(value["persistent"], false);
    }

    #[test]
    fn test_format_sync_json() {
        let now = Utc::now();
        let result = SyncResult {
            succeeded: 0,
            failed: 0,
            skipped: 3,
            skip_reason: Some(SkipReason::Offline),
            started_at: now,
            finished_at: now,
        };
        let notice = Notice::for_manual_sync(&result);

        let value: serde_json::Value =
            serde_json::from_str(&format_sync_json(&result, &notice).unwrap()).unwrap();

        assert_eq!(value["skip_reason"], "offline");
        assert_eq!(value["notice"]["level"], "error");
        assert_eq!(value["notice"]["message"], "Cannot sync while offline");
    }
}
