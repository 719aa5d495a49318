use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::features::sync::{
    format_last_sync, Indicator, Notice, NoticeLevel, QueueItem, SyncResult, SyncStatus,
};

/// Shown when the durable store could not be opened for this run.
pub const MEMORY_ONLY_WARNING: &str =
    "Warning: storage unavailable, queued items are kept in memory only and will be lost on exit";

/// Format queued items as a pretty table
pub fn format_items_pretty(items: &[QueueItem], total: usize, now: DateTime<Utc>) -> String {
    if items.is_empty() {
        return "Sync Queue (0 items)\n  Nothing waiting to sync".to_string();
    }

    let mut output = if items.len() < total {
        format!("Sync Queue ({} of {} items)\n", items.len(), total)
    } else {
        format!("Sync Queue ({} items)\n", total)
    };
    output.push_str(&"─".repeat(72));
    output.push('\n');
    output.push_str(&format!(
        "{:<38} {:<16} {:<10} {}\n",
        "ID", "Kind", "Queued", "Retries"
    ));
    output.push_str(&"─".repeat(72));
    output.push('\n');

    for item in items {
        let retries = if item.retry_count > 0 {
            item.retry_count.to_string().red().to_string()
        } else {
            "0".dimmed().to_string()
        };

        output.push_str(&format!(
            "{:<38} {:<16} {:<10} {}\n",
            item.id,
            item.kind.display_name(),
            format_last_sync(Some(item.created_at), now),
            retries
        ));
    }

    output
}

/// Format the sync status panel
pub fn format_status_pretty(
    status: &SyncStatus,
    oldest_pending: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let mut lines = Vec::new();

    lines.push("Sync Status".bold().to_string());
    lines.push("─".repeat(40));

    let badge = match status.indicator() {
        indicator @ Indicator::Offline => indicator.label().red().to_string(),
        indicator @ Indicator::Pending { .. } => indicator.label().yellow().to_string(),
        indicator @ Indicator::Synced => indicator.label().green().to_string(),
    };
    lines.push(format!("  {badge}"));

    lines.push(format!(
        "  Network:    {}",
        if status.online {
            "online".green()
        } else {
            "offline".red()
        }
    ));
    lines.push(format!("  Pending:    {}", status.pending));
    lines.push(format!(
        "  Syncing:    {}",
        if status.syncing { "yes" } else { "no" }
    ));
    lines.push(format!(
        "  Last sync:  {}",
        format_last_sync(status.last_sync, now)
    ));
    lines.push(format!(
        "  Storage:    {}",
        if status.persistent {
            "on disk".normal()
        } else {
            "in memory only".yellow()
        }
    ));

    if let Some(oldest) = oldest_pending {
        lines.push(format!(
            "  Oldest:     {}",
            format_last_sync(Some(oldest), now).dimmed()
        ));
    }

    if status.show_banner() {
        lines.push(String::new());
        lines.push(format!(
            "{} {}",
            status.banner_title().bold(),
            status.banner_detail(now).dimmed()
        ));
    }

    if !status.persistent {
        lines.push(MEMORY_ONLY_WARNING.yellow().to_string());
    }

    if status.can_sync_now() {
        lines.push(
            "Run 'fieldsync run' to sync pending items"
                .dimmed()
                .to_string(),
        );
    }

    lines.join("\n")
}

/// Format sync result for display.
pub fn format_sync_result(result: &SyncResult, notice: &Notice) -> String {
    let mut lines = vec![format_notice(notice)];

    if result.was_skipped() {
        return lines.join("\n");
    }

    lines.push("─".repeat(40));

    if result.succeeded > 0 {
        lines.push(format!(
            "  {} {}",
            "✓".green(),
            format!("{} succeeded", result.succeeded).green()
        ));
    }

    if result.failed > 0 {
        lines.push(format!(
            "  {} {}",
            "✗".red(),
            format!("{} failed (will retry on next sync)", result.failed).red()
        ));
    }

    if result.skipped > 0 {
        lines.push(format!(
            "  {} {}",
            "○".yellow(),
            format!("{} skipped", result.skipped).yellow()
        ));
    }

    lines.join("\n")
}

/// Format a toast-style notice.
pub fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => notice.message.green().to_string(),
        NoticeLevel::Info => notice.message.normal().to_string(),
        NoticeLevel::Warning => notice.message.yellow().to_string(),
        NoticeLevel::Error => notice.message.red().to_string(),
    }
}
