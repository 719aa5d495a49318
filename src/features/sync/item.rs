//! Queue item types.
//!
//! Defines the kinds of field actions that can be queued while offline and
//! the record persisted for each of them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::FieldSyncError;

/// Category of a queued field action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Unit moved to a new work state (started, completed, blocked).
    #[serde(alias = "unit_update")]
    UnitStateUpdate,
    /// Emergency job raised from the field.
    #[serde(alias = "emergency_job")]
    EmergencyJobSubmission,
    /// Change request against a unit or project.
    ChangeRequest,
    /// Photo evidence attached to a unit.
    #[serde(alias = "photo")]
    PhotoAttachment,
    /// GPS fix captured on site.
    #[serde(alias = "gps")]
    GpsCapture,
}

impl ItemKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::UnitStateUpdate,
        Self::EmergencyJobSubmission,
        Self::ChangeRequest,
        Self::PhotoAttachment,
        Self::GpsCapture,
    ];

    /// Stable snake_case name used on disk and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnitStateUpdate => "unit_state_update",
            Self::EmergencyJobSubmission => "emergency_job_submission",
            Self::ChangeRequest => "change_request",
            Self::PhotoAttachment => "photo_attachment",
            Self::GpsCapture => "gps_capture",
        }
    }

    /// Get the display name for this kind.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::UnitStateUpdate => "Unit Update",
            Self::EmergencyJobSubmission => "Emergency Job",
            Self::ChangeRequest => "Change Request",
            Self::PhotoAttachment => "Photo",
            Self::GpsCapture => "GPS Capture",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ItemKind {
    type Err = FieldSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "unit_state_update" | "unit_update" => Ok(Self::UnitStateUpdate),
            "emergency_job_submission" | "emergency_job" => Ok(Self::EmergencyJobSubmission),
            "change_request" => Ok(Self::ChangeRequest),
            "photo_attachment" | "photo" => Ok(Self::PhotoAttachment),
            "gps_capture" | "gps" => Ok(Self::GpsCapture),
            _ => Err(FieldSyncError::InvalidInput(format!(
                "Unknown item kind: {s}"
            ))),
        }
    }
}

/// One pending unit of offline-originated work.
///
/// Older snapshots used `type`, `data`, `timestamp` and `retries`; those
/// names are still accepted when loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    /// Unique within the queue for the item's lifetime.
    pub id: String,
    #[serde(alias = "type")]
    pub kind: ItemKind,
    /// Producer-supplied data, handed to the remote target untouched.
    #[serde(alias = "data", default)]
    pub payload: Value,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Failed submission attempts. Never decremented.
    #[serde(alias = "retries", default)]
    pub retry_count: u32,
}

impl QueueItem {
    /// Create a fresh item with a new id and no retries.
    #[must_use]
    pub fn new(kind: ItemKind, payload: Value) -> Self {
        Self {
            id: new_item_id(),
            kind,
            payload,
            created_at: Utc::now(),
            retry_count: 0,
        }
    }
}

/// Generate a queue item id.
///
/// UUIDv7 keeps ids roughly time ordered like the old `<millis>-<random>`
/// form while ruling out collisions between rapid enqueues.
#[must_use]
pub fn new_item_id() -> String {
    Uuid::now_v7().to_string()
}
