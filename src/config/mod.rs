//! Configuration management.
//!
//! Resolves the Daybook home directory and the sync tuning knobs.
//!
//! # Layout
//!
//! ```text
//! ~/.daybook/
//! ├── finance-storage.json   local state (envelope + local-only settings)
//! └── config.json            optional sync tuning
//! ```
//!
//! Every knob resolves in the same order: environment variable, then
//! `config.json`, then the built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sync::gc::DEFAULT_RETENTION;
use crate::sync::gist::DEFAULT_API_URL;
use crate::sync::ConflictPolicy;

/// File name of the local state file inside the home directory.
pub const STATE_FILE: &str = "finance-storage.json";

/// File name of the optional configuration file.
pub const CONFIG_FILE: &str = "config.json";

const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15 * 60);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Get the default home directory location (`~/.daybook`).
#[must_use]
pub fn default_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".daybook"))
}

/// Resolve the home directory.
///
/// Priority:
/// 1. If `explicit` is provided (the `--home` flag), use it directly
/// 2. `DAYBOOK_HOME` environment variable
/// 3. `~/.daybook`
#[must_use]
pub fn resolve_home(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(home) = std::env::var("DAYBOOK_HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    default_home()
}

/// Path of the local state file under `home`.
#[must_use]
pub fn state_path(home: &Path) -> PathBuf {
    home.join(STATE_FILE)
}

/// Contents of `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Load `config.json` from `home`; a missing file yields the defaults.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file exists but cannot be read or parsed.
pub fn load_file_config(home: &Path) -> Result<FileConfig> {
    let path = home.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Sync engine tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Quiet period after the last mutation before a push
    pub debounce: Duration,
    /// Interval between background pulls
    pub poll_interval: Duration,
    /// Upper bound for a single remote call
    pub request_timeout: Duration,
    /// How long tombstones are kept before collection
    pub retention: Duration,
    pub conflict_policy: ConflictPolicy,
    /// Base URL of the gist API
    pub api_url: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retention: DEFAULT_RETENTION,
            conflict_policy: ConflictPolicy::default(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl SyncConfig {
    /// Resolve from the process environment and `<home>/config.json`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the config file or any variable is invalid.
    pub fn resolve(home: &Path) -> Result<Self> {
        let file = load_file_config(home)?;
        Self::from_sources(|key| std::env::var(key).ok(), &file)
    }

    /// Resolve from an explicit variable lookup and file config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a value cannot be parsed.
    pub fn from_sources(env: impl Fn(&str) -> Option<String>, file: &FileConfig) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let number = |key: &str, from_file: Option<u64>| -> Result<Option<u64>> {
            match var(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got {raw:?}"))),
                None => Ok(from_file),
            }
        };

        let debounce = number("DAYBOOK_DEBOUNCE_MS", file.debounce_ms)?
            .map_or(defaults.debounce, Duration::from_millis);
        let poll_interval = number("DAYBOOK_POLL_SECS", file.poll_secs)?
            .map_or(defaults.poll_interval, Duration::from_secs);
        let request_timeout = number("DAYBOOK_TIMEOUT_SECS", file.timeout_secs)?
            .map_or(defaults.request_timeout, Duration::from_secs);
        let retention = number("DAYBOOK_RETENTION_DAYS", file.retention_days)?
            .map_or(defaults.retention, |days| Duration::from_secs(days * 24 * 60 * 60));

        let conflict_policy = match var("DAYBOOK_CONFLICT_POLICY").or_else(|| file.conflict_policy.clone()) {
            Some(raw) => raw.parse().map_err(Error::Config)?,
            None => defaults.conflict_policy,
        };

        let api_url = var("GIST_API_URL")
            .or_else(|| file.api_url.clone())
            .unwrap_or(defaults.api_url);

        if poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be greater than zero".into()));
        }

        Ok(Self {
            debounce,
            poll_interval,
            request_timeout,
            retention,
            conflict_policy,
            api_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SyncConfig::from_sources(env_of(&[]), &FileConfig::default()).unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.debounce, Duration::from_secs(2));
        assert_eq!(config.poll_interval, Duration::from_secs(900));
        assert_eq!(config.retention, Duration::from_secs(30 * 86_400));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig {
            debounce_ms: Some(500),
            poll_secs: Some(60),
            conflict_policy: Some("ask".into()),
            ..FileConfig::default()
        };
        let env = env_of(&[("DAYBOOK_DEBOUNCE_MS", "100"), ("DAYBOOK_CONFLICT_POLICY", "remote-wins")]);

        let config = SyncConfig::from_sources(env, &file).unwrap();
        assert_eq!(config.debounce, Duration::from_millis(100));
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.conflict_policy, ConflictPolicy::RemoteWins);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = SyncConfig::from_sources(env_of(&[("DAYBOOK_POLL_SECS", "soon")]), &FileConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = SyncConfig::from_sources(env_of(&[("DAYBOOK_POLL_SECS", "0")]), &FileConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let file = FileConfig {
            conflict_policy: Some("coinflip".into()),
            ..FileConfig::default()
        };
        assert!(SyncConfig::from_sources(env_of(&[]), &file).is_err());
    }

    #[test]
    fn test_load_file_config() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_file_config(dir.path()).unwrap(), FileConfig::default());

        fs::write(dir.path().join(CONFIG_FILE), r#"{"retentionDays": 7, "apiUrl": "http://x"}"#).unwrap();
        let file = load_file_config(dir.path()).unwrap();
        assert_eq!(file.retention_days, Some(7));

        let config = SyncConfig::from_sources(env_of(&[]), &file).unwrap();
        assert_eq!(config.retention, Duration::from_secs(7 * 86_400));
        assert_eq!(config.api_url, "http://x");

        fs::write(dir.path().join(CONFIG_FILE), "{").unwrap();
        assert!(load_file_config(dir.path()).is_err());
    }

    #[test]
    fn test_resolve_home_explicit() {
        let explicit = PathBuf::from("/tmp/daybook-home");
        assert_eq!(resolve_home(Some(&explicit)), Some(explicit.clone()));
        assert_eq!(state_path(&explicit), explicit.join(STATE_FILE));
    }
}
