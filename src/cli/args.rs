use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::HOME_ENV;
use crate::features::sync::ItemKind;

#[derive(Parser)]
#[command(name = "fieldsync")]
#[command(about = "Offline action queue and sync engine for field operations")]
#[command(long_about = "fieldsync - queue field actions offline, sync them when back online

Actions recorded without connectivity (unit updates, emergency jobs, change
requests, photos, GPS fixes) are stored locally and replayed in order once
the network is reachable. Failed items stay queued and are retried on the
next sync.

QUICK START:
  fieldsync add unit_state_update --payload '{\"unitId\":\"U-12\"}'
  fieldsync status                 Show connectivity and pending items
  fieldsync list                   List queued items
  fieldsync run                    Sync now

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Defaults to `general.default_output` from the config file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Data directory holding config.yaml and the queue database
    #[arg(long, global = true, env = HOME_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Treat the network as unreachable for this invocation
    #[arg(long, global = true)]
    pub offline: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show connectivity, pending items and last sync time
    #[command(alias = "s")]
    Status,

    /// Queue a field action for sync
    ///
    /// # Kinds
    ///
    ///   unit_state_update, emergency_job_submission, change_request,
    ///   photo_attachment, gps_capture
    ///
    /// # Examples
    ///
    ///   fieldsync add gps_capture --payload '{"lat":-33.92,"lng":18.42}'
    ///   fieldsync add photo --payload '{"unitId":"U-4","file":"roof.jpg"}'
    #[command(alias = "a")]
    Add {
        /// Item kind
        kind: ItemKind,

        /// JSON payload handed to the remote target
        #[arg(long, short = 'p')]
        payload: Option<String>,
    },

    /// List queued items in sync order
    #[command(alias = "ls")]
    List {
        /// Maximum items to show
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Sync queued items now
    ///
    /// Submits every queued item in order. Items that fail stay queued
    /// with their retry count increased.
    Run,

    /// Remove a single item without syncing it
    #[command(alias = "rm")]
    Remove {
        /// Item ID
        id: String,
    },

    /// Remove every queued item
    Clear {
        /// Required to actually clear the queue
        #[arg(long)]
        force: bool,
    },
}
