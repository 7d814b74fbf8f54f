//! Sync types shared by the codec, merge engine and orchestrator.

use serde::Serialize;
use tokio::sync::oneshot;

/// What a successful sync attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// A new remote document was created.
    Created,
    /// The existing remote document was overwritten with local data.
    Updated,
    /// Remote data was merged into local data.
    Merged,
    /// Local data was replaced by remote data.
    Overwritten,
    /// Local and remote data were already identical.
    NoChanges,
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Merged => write!(f, "merged"),
            Self::Overwritten => write!(f, "overwritten"),
            Self::NoChanges => write!(f, "no_changes"),
        }
    }
}

/// Per-attempt status: `Idle → Loading → Success | Error → Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Loading,
    Success(SyncAction),
    Error(String),
}

/// Observable sync state published by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncState {
    #[serde(flatten)]
    pub status: SyncStatus,
    pub last_action: Option<SyncAction>,
    pub last_error: Option<String>,
    /// Unix milliseconds of the last successful round-trip.
    pub last_synced_at: Option<i64>,
}

/// How a pull resolves differences between local and remote data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Merge per record with the timestamp and tombstone rules.
    #[default]
    AutoMerge,
    /// Ask the caller through a [`ConflictPrompt`].
    Ask,
    /// Replace local data with the remote copy.
    RemoteWins,
    /// Keep local data and overwrite the remote copy on the next push.
    LocalWins,
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AutoMerge => write!(f, "auto-merge"),
            Self::Ask => write!(f, "ask"),
            Self::RemoteWins => write!(f, "remote-wins"),
            Self::LocalWins => write!(f, "local-wins"),
        }
    }
}

impl std::str::FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "auto-merge" | "merge" | "auto" => Ok(Self::AutoMerge),
            "ask" => Ok(Self::Ask),
            "remote-wins" | "remote" => Ok(Self::RemoteWins),
            "local-wins" | "local" => Ok(Self::LocalWins),
            _ => Err(format!("Unknown conflict policy: {s}")),
        }
    }
}

/// The caller's answer to a [`ConflictPrompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Merge,
    UseRemote,
    KeepLocal,
}

/// Sent to the calling layer when the policy is [`ConflictPolicy::Ask`].
#[derive(Debug)]
pub struct ConflictPrompt {
    /// Records (tombstones included) held locally.
    pub local_records: usize,
    /// Records (tombstones included) in the remote document.
    pub remote_records: usize,
    pub reply: oneshot::Sender<Resolution>,
}

/// Statistics for a merge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Records where the local version was kept (including local-only).
    pub from_local: usize,
    /// Records where the remote version was taken (including remote-only).
    pub from_remote: usize,
    /// Records present on both sides with differing content.
    pub conflicts: usize,
    /// Tombstones undone by a newer live edit on the other side.
    pub resurrected: usize,
}

impl MergeStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.from_local + self.from_remote
    }
}

/// Statistics for a tombstone collection pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GcStats {
    pub transactions: usize,
    pub tasks: usize,
}

impl GcStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.transactions + self.tasks
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Outcome of one sync round-trip.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub action: SyncAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeStats>,
    #[serde(skip_serializing_if = "GcStats::is_empty")]
    pub collected: GcStats,
    /// Set when the push created a new remote document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gist_id: Option<String>,
}

impl SyncReport {
    #[must_use]
    pub fn new(action: SyncAction) -> Self {
        Self {
            action,
            merge: None,
            collected: GcStats::default(),
            gist_id: None,
        }
    }
}

/// Sync-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The backup envelope is missing required fields.
    #[error("Malformed backup: {0}")]
    MalformedBackup(String),

    /// Network or remote store failure (including timeouts).
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// The remote store rejected the token.
    #[error("Remote store rejected the credentials: {0}")]
    Unauthorized(String),

    /// Pull attempted before any remote document exists.
    #[error("No remote document to pull from")]
    NoRemoteDocument,

    /// Sync is disabled or no token is configured.
    #[error("Sync is disabled or credentials are missing")]
    CredentialsMissing,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Whether the next poll or mutation may succeed where this failed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::RemoteUnavailable(_))
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
