//! Application state and the versioned backup envelope.
//!
//! The envelope is the wire format shared by the remote document and the
//! local state file:
//!
//! ```json
//! {"state":{"data":{...},"userName":"","language":"en",...,"isSyncEnable":false},"version":1}
//! ```

use serde::{Deserialize, Serialize};

use super::Snapshot;

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 1;

/// Everything the store owns: the dataset plus scalar user/session fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub data: Snapshot,
    #[serde(default)]
    pub user_name: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub selected_date: String,
    #[serde(default)]
    pub default_date: String,
    /// Remote store credential (opaque to the sync engine)
    #[serde(default)]
    pub token: String,
    /// Remote document handle; empty until the first push creates one
    #[serde(default)]
    pub gist_id: String,
    /// File name inside the remote document
    #[serde(default)]
    pub filename: String,
    #[serde(default, rename = "isSyncEnable")]
    pub sync_enabled: bool,
    #[serde(default)]
    pub avatar_url: String,

    /// Local-only report preferences, never part of the envelope
    #[serde(skip)]
    pub settings: ReportSettings,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            data: Snapshot::default(),
            user_name: String::new(),
            language: default_language(),
            selected_date: String::new(),
            default_date: String::new(),
            token: String::new(),
            gist_id: String::new(),
            filename: String::new(),
            sync_enabled: false,
            avatar_url: String::new(),
            settings: ReportSettings::default(),
        }
    }
}

impl AppState {
    /// Whether sync is switched on and a credential is present.
    #[must_use]
    pub fn can_sync(&self) -> bool {
        self.sync_enabled && !self.token.is_empty()
    }
}

/// The versioned envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub state: AppState,
    pub version: u32,
}

/// Which period the reports open on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultView {
    Daily,
    #[default]
    Monthly,
    Yearly,
}

impl DefaultView {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for DefaultView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DefaultView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" => Ok(Self::Yearly),
            _ => Err(format!("Unknown view: {s}")),
        }
    }
}

/// Local report preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSettings {
    #[serde(default)]
    pub default_view: DefaultView,
}
