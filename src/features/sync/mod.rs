//! Offline sync for field actions.
//!
//! Actions taken without connectivity are queued, persisted immediately, and
//! replayed against the remote target once the network returns.
//!
//! Features:
//! - Write-through queue that survives restarts
//! - Reactive connectivity monitor with ordered observers
//! - Single-flight drain with per-item retry accounting
//! - Automatic drain on reconnect, plus manual "sync now"

pub mod connectivity;
pub mod engine;
pub mod item;
pub mod queue;
pub mod remote;
pub mod status;

pub use connectivity::{Connectivity, ConnectivityMonitor, SubscriptionId};
pub use engine::{RemoteTarget, SkipReason, SyncEngine, SyncResult};
pub use item::{ItemKind, QueueItem};
pub use queue::{QueueStats, SyncQueue};
pub use remote::SimulatedRemote;
pub use status::{format_last_sync, Indicator, Notice, NoticeLevel, SyncStatus};
