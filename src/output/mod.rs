//! Output formatting for fieldsync.
//!
//! This module provides formatters for displaying queue and sync state in
//! various formats.

mod json;
mod pretty;

use chrono::{DateTime, Utc};

use crate::cli::args::OutputFormat;
use crate::error::FieldSyncError;
use crate::features::sync::{Notice, QueueItem, SyncResult, SyncStatus};

pub use json::*;
pub use pretty::*;

/// Format queued items based on output format
///
/// # Errors
///
/// Returns `FieldSyncError::Parse` if JSON serialization fails.
pub fn format_items(
    items: &[QueueItem],
    total: usize,
    format: OutputFormat,
) -> Result<String, FieldSyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_items_pretty(items, total, Utc::now())),
        OutputFormat::Json => format_items_json(items, total),
    }
}

/// Format sync status based on output format
///
/// # Errors
///
/// Returns `FieldSyncError::Parse` if JSON serialization fails.
pub fn format_status(
    status: &SyncStatus,
    oldest_pending: Option<DateTime<Utc>>,
    format: OutputFormat,
) -> Result<String, FieldSyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_status_pretty(status, oldest_pending, Utc::now())),
        OutputFormat::Json => format_status_json(status, oldest_pending),
    }
}

/// Format a manual sync outcome based on output format
///
/// # Errors
///
/// Returns `FieldSyncError::Parse` if JSON serialization fails.
pub fn format_sync(
    result: &SyncResult,
    notice: &Notice,
    format: OutputFormat,
) -> Result<String, FieldSyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_sync_result(result, notice)),
        OutputFormat::Json => format_sync_json(result, notice),
    }
}
