//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::model::{DefaultView, TransactionKind};

pub mod commands;

/// Daybook - offline-first finance and task journal with gist sync
#[derive(Parser, Debug)]
#[command(name = "daybook", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: ~/.daybook)
    #[arg(long, global = true, env = "DAYBOOK_HOME")]
    pub home: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Income and expense entries
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },

    /// Per-day tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Income, expense and balance for a year, month or day
    Summary {
        year: String,
        month: Option<String>,
        day: Option<String>,
    },

    /// Export or import a backup file
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },

    /// Profile and sync credentials
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Report view settings
    View {
        #[command(subcommand)]
        command: ViewCommands,
    },

    /// Delete every record in a scope (all, YEAR, YEAR/MONTH or YEAR/MONTH/DAY)
    Reset {
        scope: String,

        /// Confirmation token printed by a first run without it
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Sync with the remote gist
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },

    /// Print version information
    Version,
}

// ============================================================================
// Record Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum TxCommands {
    /// Record a transaction
    Add(TxAddArgs),

    /// Edit a transaction
    Edit(TxEditArgs),

    /// Delete a transaction
    Rm(RecordRef),

    /// Undo a delete
    Restore(RecordRef),

    /// List transactions in a scope
    List {
        /// all, YEAR, YEAR/MONTH or YEAR/MONTH/DAY
        #[arg(default_value = "all")]
        scope: String,

        /// Only income or only expense
        #[arg(long = "type")]
        kind: Option<TransactionKind>,
    },
}

#[derive(Args, Debug)]
pub struct TxAddArgs {
    /// YEAR/MONTH/DAY
    pub date: String,

    /// income or expense
    pub kind: TransactionKind,

    pub amount: Decimal,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Label (repeatable)
    #[arg(short, long = "label")]
    pub labels: Vec<String>,

    /// Use this id instead of a generated one
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args, Debug)]
pub struct TxEditArgs {
    #[command(flatten)]
    pub record: RecordRef,

    #[arg(long)]
    pub amount: Option<Decimal>,

    #[arg(long = "type")]
    pub kind: Option<TransactionKind>,

    /// New description (empty string clears it)
    #[arg(short, long)]
    pub description: Option<String>,

    /// Replace labels (repeatable)
    #[arg(short, long = "label")]
    pub labels: Vec<String>,

    /// Remove all labels
    #[arg(long, conflicts_with = "labels")]
    pub clear_labels: bool,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task
    Add(TaskAddArgs),

    /// Edit a task
    Edit(TaskEditArgs),

    /// Delete a task
    Rm(RecordRef),

    /// Undo a delete
    Restore(RecordRef),

    /// Toggle a task between done and not done
    Done(RecordRef),

    /// List tasks in a scope
    List {
        /// all, YEAR, YEAR/MONTH or YEAR/MONTH/DAY
        #[arg(default_value = "all")]
        scope: String,

        /// Hide finished tasks
        #[arg(long)]
        pending: bool,
    },
}

#[derive(Args, Debug)]
pub struct TaskAddArgs {
    /// YEAR/MONTH/DAY
    pub date: String,

    pub title: String,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub priority: Option<i64>,

    /// Use this id instead of a generated one
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args, Debug)]
pub struct TaskEditArgs {
    #[command(flatten)]
    pub record: RecordRef,

    #[arg(short, long)]
    pub title: Option<String>,

    /// New description (empty string clears it)
    #[arg(short, long)]
    pub description: Option<String>,

    /// New priority (0 clears it)
    #[arg(short, long)]
    pub priority: Option<i64>,
}

/// A record addressed by day and id.
#[derive(Args, Debug)]
pub struct RecordRef {
    /// YEAR/MONTH/DAY
    pub date: String,

    pub id: String,
}

// ============================================================================
// Backup / Profile / View
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Write the backup envelope
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace local data with a backup file
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show profile and sync settings
    Show,

    /// Update profile fields
    Set(ProfileSetArgs),
}

#[derive(Args, Debug)]
pub struct ProfileSetArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub selected_date: Option<String>,

    #[arg(long)]
    pub default_date: Option<String>,

    /// Personal access token with the `gist` scope
    #[arg(long, env = "DAYBOOK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Existing gist to sync with
    #[arg(long)]
    pub gist_id: Option<String>,

    /// File name inside the gist
    #[arg(long)]
    pub filename: Option<String>,

    /// Enable or disable sync
    #[arg(long)]
    pub sync: Option<bool>,

    #[arg(long)]
    pub avatar_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ViewCommands {
    /// Change the default report view
    Set {
        /// daily, monthly or yearly
        view: DefaultView,

        /// Confirmation token printed by a first run without it
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Restore default report settings
    Reset {
        #[arg(long)]
        confirm: Option<String>,
    },
}

// ============================================================================
// Sync Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum SyncCommands {
    /// Pull remote changes, then push local ones
    Now,

    /// Push local data to the remote
    Push,

    /// Pull remote data
    Pull {
        /// Replace local data with the remote copy instead of merging
        #[arg(long)]
        replace: bool,
    },

    /// Show sync state without contacting the remote
    Status,

    /// Keep syncing in the foreground until interrupted
    Watch,

    /// Permanently drop expired tombstones from local data
    Gc {
        /// Retention in days (default: configured retention)
        #[arg(long)]
        days: Option<u64>,
    },
}
