//! The local state file.
//!
//! The file holds the backup envelope plus two local-only sections that never
//! go to the remote:
//!
//! ```json
//! {"state":{...},"version":1,"settings":{"defaultView":"monthly"},"sync":{"lastSyncedAt":...,"lastSyncedHash":"..."}}
//! ```
//!
//! Loading goes through the same decoder as remote documents, so an old
//! local file is migrated on start-up.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::file::atomic_write;
use crate::config::STATE_FILE;
use crate::error::{Error, Result};
use crate::model::{AppState, ReportSettings};
use crate::sync::codec;

/// Sync bookkeeping kept between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMeta {
    /// Unix milliseconds of the last successful round-trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<i64>,
    /// Content hash of the data as it was last seen on the remote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_hash: Option<String>,
}

/// What a load returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalState {
    pub state: AppState,
    pub sync: SyncMeta,
}

/// Handle to the state file on disk.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The state file inside a home directory.
    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join(STATE_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the state file. A missing file yields an empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not an envelope.
    pub fn load(&self, now: i64) -> Result<LocalState> {
        if !self.exists() {
            debug!(path = %self.path.display(), "No state file yet");
            return Ok(LocalState::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let mut value: Value = serde_json::from_str(&content)?;

        let settings = take_section::<ReportSettings>(&mut value, "settings")?;
        let sync = take_section::<SyncMeta>(&mut value, "sync")?;
        let backup = codec::decode_value(value, now)?;

        let mut state = backup.state;
        state.settings = settings;
        info!(
            path = %self.path.display(),
            records = state.data.record_count(),
            "Loaded local state"
        );
        Ok(LocalState { state, sync })
    }

    /// Write the state atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, state: &AppState, sync: &SyncMeta) -> Result<()> {
        let mut value = serde_json::to_value(codec::export(state))?;
        if let Value::Object(map) = &mut value {
            map.insert("settings".into(), serde_json::to_value(&state.settings)?);
            map.insert("sync".into(), serde_json::to_value(sync)?);
        }
        let content = serde_json::to_string_pretty(&value)?;
        atomic_write(&self.path, &content)?;
        debug!(path = %self.path.display(), bytes = content.len(), "Saved local state");
        Ok(())
    }
}

fn take_section<T: serde::de::DeserializeOwned + Default>(value: &mut Value, key: &str) -> Result<T> {
    match value.as_object_mut().and_then(|map| map.remove(key)) {
        Some(section) => serde_json::from_value(section)
            .map_err(|e| Error::Other(format!("Invalid `{key}` section in state file: {e}"))),
        None => Ok(T::default()),
    }
}
