//! Status presentation for sync indicators, banners and manual-sync toasts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::engine::{SkipReason, SyncResult};

/// Snapshot of the observable sync state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub online: bool,
    pub pending: usize,
    pub syncing: bool,
    pub last_sync: Option<DateTime<Utc>>,
    /// False when the durable store fell back to memory for this session.
    pub persistent: bool,
}

/// What a status badge should show. Offline wins over pending work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Offline,
    Pending { count: usize, syncing: bool },
    Synced,
}

impl Indicator {
    /// Short badge text.
    #[must_use]
    pub fn compact_label(&self) -> String {
        match self {
            Self::Offline => "Offline".to_string(),
            Self::Pending { count, .. } => format!("{count} pending"),
            Self::Synced => "Synced".to_string(),
        }
    }

    /// Full badge text.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Offline => "Offline Mode".to_string(),
            Self::Pending { count, .. } => format!("{count} pending sync"),
            Self::Synced => "All synced".to_string(),
        }
    }
}

impl SyncStatus {
    #[must_use]
    pub const fn indicator(&self) -> Indicator {
        if !self.online {
            Indicator::Offline
        } else if self.pending > 0 {
            Indicator::Pending {
                count: self.pending,
                syncing: self.syncing,
            }
        } else {
            Indicator::Synced
        }
    }

    /// The offline banner is only shown when there is something to say.
    #[must_use]
    pub const fn show_banner(&self) -> bool {
        !self.online || self.pending > 0
    }

    /// Banner title.
    #[must_use]
    pub const fn banner_title(&self) -> &'static str {
        if self.online {
            "Pending Sync"
        } else {
            "You're Offline"
        }
    }

    /// Banner detail line, e.g. `2 items waiting to sync • Last sync: 5m ago`.
    #[must_use]
    pub fn banner_detail(&self, now: DateTime<Utc>) -> String {
        let mut detail = if self.pending > 0 {
            format!(
                "{} item{} waiting to sync",
                self.pending,
                if self.pending == 1 { "" } else { "s" }
            )
        } else {
            "Changes saved locally".to_string()
        };

        if self.last_sync.is_some() {
            detail.push_str(" • Last sync: ");
            detail.push_str(&format_last_sync(self.last_sync, now));
        }

        detail
    }

    /// Whether a manual "sync now" control should be offered.
    #[must_use]
    pub const fn can_sync_now(&self) -> bool {
        self.online && self.pending > 0 && !self.syncing
    }
}

/// Relative description of the last sync time.
#[must_use]
pub fn format_last_sync(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(last) = last else {
        return "Never".to_string();
    };

    let minutes = now.signed_duration_since(last).num_minutes();
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 24 * 60 {
        format!("{}h ago", minutes / 60)
    } else {
        last.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Toast-style message for a manually triggered sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Message shown after the user asked to sync.
    ///
    /// Automatic drains stay silent; only this path turns skips into text.
    #[must_use]
    pub fn for_manual_sync(result: &SyncResult) -> Self {
        match result.skip_reason {
            Some(SkipReason::Offline) => Self::new(NoticeLevel::Error, "Cannot sync while offline"),
            Some(SkipReason::Empty) => Self::new(NoticeLevel::Info, "Nothing to sync"),
            Some(SkipReason::AlreadyRunning) => {
                Self::new(NoticeLevel::Info, "Sync already in progress")
            }
            None if result.failed == 0 => Self::new(NoticeLevel::Success, "Data synced successfully!"),
            None if result.succeeded == 0 => Self::new(
                NoticeLevel::Error,
                format!("Sync failed: {} item{} still pending", result.failed, plural(result.failed)),
            ),
            None => Self::new(
                NoticeLevel::Warning,
                format!(
                    "Synced {} item{}, {} failed to sync",
                    result.succeeded,
                    plural(result.succeeded),
                    result.failed
                ),
            ),
        }
    }
}

const fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
