//! Sync queue command implementation.
//!
//! Handles the queue management and manual sync commands.

use serde_json::{json, Value};

use super::Context;
use crate::cli::args::OutputFormat;
use crate::error::FieldSyncError;
use crate::features::sync::ItemKind;
use crate::output::{format_items, format_status, format_sync, to_json, MEMORY_ONLY_WARNING};

/// Show connectivity and queue status.
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn status(ctx: &Context, format: OutputFormat) -> Result<String, FieldSyncError> {
    let status = ctx.engine.status();
    let oldest = ctx.engine.queue().stats().oldest_pending;
    format_status(&status, oldest, format)
}

/// Queue a field action.
///
/// Warns when the store fell back to memory, since the item will not
/// survive this process.
///
/// # Errors
///
/// Returns an error if the payload is not valid JSON.
pub fn add(
    ctx: &Context,
    kind: ItemKind,
    payload: Option<&str>,
    format: OutputFormat,
) -> Result<String, FieldSyncError> {
    let payload: Value = match payload {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| FieldSyncError::InvalidInput(format!("Payload is not valid JSON: {e}")))?,
        None => json!({}),
    };

    let id = ctx.engine.queue().enqueue(kind, payload);
    let pending = ctx.engine.pending_count();

    match format {
        OutputFormat::Json => {
            let item = ctx
                .engine
                .queue()
                .get(&id)
                .ok_or_else(|| FieldSyncError::NotFound(format!("Item {id}")))?;
            to_json(&json!({
                "item": item,
                "pending": pending,
                "persistent": ctx.engine.is_persistent(),
            }))
        }
        OutputFormat::Pretty => {
            let mut output = format!(
                "Queued {} (ID: {id})\n{pending} item{} waiting to sync",
                kind.display_name(),
                if pending == 1 { "" } else { "s" }
            );
            if !ctx.engine.is_persistent() {
                output.push('\n');
                output.push_str(MEMORY_ONLY_WARNING);
            }
            Ok(output)
        }
    }
}

/// List queued items.
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub fn list(ctx: &Context, limit: usize, format: OutputFormat) -> Result<String, FieldSyncError> {
    let items = ctx.engine.queue().snapshot();
    let total = items.len();
    let shown: Vec<_> = items.into_iter().take(limit).collect();
    format_items(&shown, total, format)
}

/// Sync queued items now.
///
/// Skips (offline, nothing queued) are reported as notices, not errors.
///
/// # Errors
///
/// Returns an error if output formatting fails.
pub async fn run(ctx: &Context, format: OutputFormat) -> Result<String, FieldSyncError> {
    let (result, notice) = ctx.engine.sync_now(ctx.remote.as_ref()).await;
    format_sync(&result, &notice, format)
}

/// Remove a single item without syncing it.
///
/// # Errors
///
/// Returns `FieldSyncError::NotFound` if no item has that id.
pub fn remove(ctx: &Context, id: &str, format: OutputFormat) -> Result<String, FieldSyncError> {
    if !ctx.engine.queue().remove(id) {
        return Err(FieldSyncError::NotFound(format!("Item {id}")));
    }

    match format {
        OutputFormat::Json => to_json(&json!({ "removed": id })),
        OutputFormat::Pretty => Ok(format!("Removed {id}")),
    }
}

/// Remove every queued item.
///
/// # Errors
///
/// Returns an error unless `force` is set.
pub fn clear(ctx: &Context, force: bool, format: OutputFormat) -> Result<String, FieldSyncError> {
    if !force {
        return Err(FieldSyncError::InvalidInput(
            "Use --force to clear all queued items".to_string(),
        ));
    }

    let count = ctx.engine.queue().clear();

    match format {
        OutputFormat::Json => to_json(&json!({ "cleared": count })),
        OutputFormat::Pretty => Ok(format!("Cleared {count} items from the sync queue")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Paths};
    use tempfile::TempDir;

    async fn context(dir: &TempDir, offline: bool) -> Context {
        let mut config = Config::default();
        config.remote.latency_ms = 0;
        let paths = Paths::with_root(dir.path().to_path_buf());
        Context::open(&paths, &config, offline).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, true).await;

        let output = add(&ctx, ItemKind::GpsCapture, Some(r#"{"lat": 1.5}"#), OutputFormat::Pretty).unwrap();
        assert!(output.contains("Queued GPS Capture"));

        let listed = list(&ctx, 10, OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&listed).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["items"][0]["payload"]["lat"], 1.5);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_payload() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, true).await;

        let err = add(&ctx, ItemKind::ChangeRequest, Some("{broken"), OutputFormat::Pretty).unwrap_err();
        assert!(matches!(err, FieldSyncError::InvalidInput(_)));
        assert_eq!(ctx.engine.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_run_offline_reports_notice() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, true).await;
        add(&ctx, ItemKind::UnitStateUpdate, None, OutputFormat::Pretty).unwrap();

        let output = run(&ctx, OutputFormat::Json).await.unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["notice"]["message"], "Cannot sync while offline");
        assert_eq!(ctx.engine.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_run_online_syncs() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, false).await;
        add(&ctx, ItemKind::UnitStateUpdate, None, OutputFormat::Pretty).unwrap();
        add(&ctx, ItemKind::PhotoAttachment, None, OutputFormat::Pretty).unwrap();

        let output = run(&ctx, OutputFormat::Json).await.unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["succeeded"], 2);
        assert_eq!(value["notice"]["level"], "success");
        assert_eq!(ctx.engine.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, true).await;
        let id = ctx.engine.queue().enqueue(ItemKind::GpsCapture, json!({}));
        ctx.engine.queue().enqueue(ItemKind::GpsCapture, json!({}));

        assert!(remove(&ctx, &id, OutputFormat::Pretty).is_ok());
        assert!(matches!(
            remove(&ctx, &id, OutputFormat::Pretty),
            Err(FieldSyncError::NotFound(_))
        ));

        assert!(clear(&ctx, false, OutputFormat::Pretty).is_err());
        assert_eq!(ctx.engine.pending_count(), 1);
        clear(&ctx, true, OutputFormat::Pretty).unwrap();
        assert_eq!(ctx.engine.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_status_json() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, true).await;
        ctx.engine.queue().enqueue(ItemKind::EmergencyJobSubmission, json!({}));

        let value: Value = serde_json::from_str(&status(&ctx, OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(value["online"], false);
        assert_eq!(value["pending"], 1);
        assert!(value["oldest_pending"].is_string());
    }

    #[tokio::test]
    async fn test_add_warns_when_store_is_memory_only() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let mut config = Config::default();
        config.remote.latency_ms = 0;
        let paths = Paths::with_root(blocker.join("data"));
        let ctx = Context::open(&paths, &config, true).await.unwrap();

        let output = add(&ctx, ItemKind::GpsCapture, None, OutputFormat::Pretty).unwrap();
        assert!(output.contains(MEMORY_ONLY_WARNING));

        let value: Value = serde_json::from_str(&status(&ctx, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(value["persistent"], false);
        assert_eq!(value["pending"], 1);
    }

    #[tokio::test]
    async fn test_add_on_disk_has_no_warning() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, true).await;

        let output = add(&ctx, ItemKind::GpsCapture, None, OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["persistent"], true);
        assert!(!add(&ctx, ItemKind::GpsCapture, None, OutputFormat::Pretty)
            .unwrap()
            .contains(MEMORY_ONLY_WARNING));
    }
}
