//! Backup envelope encoding and decoding.
//!
//! Decoding is lenient about versions and strict about shape: the document
//! must be a JSON object with a `state` object. A missing or non-numeric
//! `version` is read as 0, older versions are migrated, and versions newer
//! than this build are accepted as-is with a warning.

use serde_json::Value;
use tracing::{debug, warn};

use super::migrations;
use super::types::{SyncError, SyncResult};
use crate::clock::MAX_STAMP;
use crate::model::{AppState, Backup, CURRENT_VERSION};

/// Wrap the current state in an envelope stamped with [`CURRENT_VERSION`].
#[must_use]
pub fn export(state: &AppState) -> Backup {
    Backup {
        state: state.clone(),
        version: CURRENT_VERSION,
    }
}

/// Serialize an envelope as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(backup: &Backup) -> SyncResult<String> {
    Ok(serde_json::to_string_pretty(backup)?)
}

/// Parse and migrate an envelope from JSON text.
///
/// # Errors
///
/// Returns [`SyncError::Json`] for invalid JSON and
/// [`SyncError::MalformedBackup`] when the document is not an envelope.
pub fn decode_backup(content: &str, now: i64) -> SyncResult<Backup> {
    let value: Value = serde_json::from_str(content)?;
    decode_value(value, now)
}

/// Migrate and deserialize an already-parsed envelope.
///
/// # Errors
///
/// Returns [`SyncError::MalformedBackup`] if `state` is missing, does not
/// match the model after migration, or carries a stamp past [`MAX_STAMP`].
pub fn decode_value(mut value: Value, now: i64) -> SyncResult<Backup> {
    let version = read_version(&value);
    let Some(state) = value.get_mut("state").filter(|s| s.is_object()) else {
        return Err(SyncError::MalformedBackup("missing `state` object".into()));
    };

    let mut state = state.take();
    let version = if version > CURRENT_VERSION {
        warn!(version, current = CURRENT_VERSION, "Backup is newer than this build");
        version
    } else {
        migrations::migrate(&mut state, version, now)
    };

    let state: AppState =
        serde_json::from_value(state).map_err(|e| SyncError::MalformedBackup(e.to_string()))?;
    if let Some(stamp) = state.data.max_stamp().filter(|&s| s > MAX_STAMP) {
        return Err(SyncError::MalformedBackup(format!(
            "record stamp {stamp} is past year 9999"
        )));
    }
    debug!(version, records = state.data.record_count(), "Decoded backup");

    Ok(Backup {
        state,
        version: version.max(CURRENT_VERSION),
    })
}

fn read_version(value: &Value) -> u32 {
    match value.get("version").and_then(Value::as_u64) {
        Some(v) => u32::try_from(v).unwrap_or(u32::MAX),
        None => {
            warn!("Backup has no version, assuming 0");
            0
        }
    }
}
