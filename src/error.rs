//! Error types for Daybook.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=not_found, 4=validation, 6=sync, etc.)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers

use std::path::PathBuf;
use thiserror::Error;

use crate::sync::SyncError;

/// Result type alias for Daybook operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Not Found (exit 3)
    RecordNotFound,
    BackupNotFound,

    // Validation (exit 4)
    InvalidArgument,
    InvalidDate,
    ConfirmationMismatch,

    // Sync (exit 6)
    MalformedBackup,
    RemoteUnavailable,
    Unauthorized,
    NoRemoteDocument,
    CredentialsMissing,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::BackupNotFound => "BACKUP_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidDate => "INVALID_DATE",
            Self::ConfirmationMismatch => "CONFIRMATION_MISMATCH",
            Self::MalformedBackup => "MALFORMED_BACKUP",
            Self::RemoteUnavailable => "REMOTE_UNAVAILABLE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NoRemoteDocument => "NO_REMOTE_DOCUMENT",
            Self::CredentialsMissing => "CREDENTIALS_MISSING",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::RecordNotFound | Self::BackupNotFound => 3,
            Self::InvalidArgument | Self::InvalidDate | Self::ConfirmationMismatch => 4,
            Self::MalformedBackup
            | Self::RemoteUnavailable
            | Self::Unauthorized
            | Self::NoRemoteDocument
            | Self::CredentialsMissing => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying (possibly with corrected input) can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument
                | Self::InvalidDate
                | Self::ConfirmationMismatch
                | Self::RemoteUnavailable
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Daybook operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} not found: {id}")]
    RecordNotFound { kind: &'static str, id: String },

    #[error("Backup file not found: {path}")]
    BackupNotFound { path: PathBuf },

    #[error("Invalid date '{0}': expected YEAR/MONTH/DAY")]
    InvalidDate(String),

    #[error("Confirmation token does not match the pending change")]
    ConfirmationMismatch { expected: String },

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::RecordNotFound { .. } => ErrorCode::RecordNotFound,
            Self::BackupNotFound { .. } => ErrorCode::BackupNotFound,
            Self::InvalidDate(_) => ErrorCode::InvalidDate,
            Self::ConfirmationMismatch { .. } => ErrorCode::ConfirmationMismatch,
            Self::Sync(e) => match e {
                SyncError::MalformedBackup(_) => ErrorCode::MalformedBackup,
                SyncError::RemoteUnavailable(_) => ErrorCode::RemoteUnavailable,
                SyncError::Unauthorized(_) => ErrorCode::Unauthorized,
                SyncError::NoRemoteDocument => ErrorCode::NoRemoteDocument,
                SyncError::CredentialsMissing => ErrorCode::CredentialsMissing,
                SyncError::Json(_) => ErrorCode::JsonError,
                SyncError::Io(_) => ErrorCode::IoError,
            },
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::RecordNotFound { kind, .. } => Some(format!(
                "Use `daybook {} list` with the same date to see available ids.",
                if *kind == "Task" { "task" } else { "tx" }
            )),
            Self::InvalidDate(_) => {
                Some("Dates are written as YEAR/MONTH/DAY, e.g. 1403/05/12".to_string())
            }
            Self::ConfirmationMismatch { expected } => Some(format!(
                "The data changed since the token was issued. Re-run with --confirm {expected}"
            )),
            Self::Sync(SyncError::CredentialsMissing) => Some(
                "Enable sync and set a token: daybook profile set --sync true --token <token>"
                    .to_string(),
            ),
            Self::Sync(SyncError::NoRemoteDocument) => Some(
                "Run `daybook sync push` to create the remote document, or set --gist-id"
                    .to_string(),
            ),
            Self::Sync(SyncError::RemoteUnavailable(_)) => {
                Some("Check your connection and token, then retry `daybook sync now`".to_string())
            }
            Self::Sync(SyncError::Unauthorized(_)) => Some(
                "The token was rejected. It needs the `gist` scope: daybook profile set --token <token>"
                    .to_string(),
            ),
            Self::Sync(SyncError::MalformedBackup(_)) => {
                Some("The file is not a Daybook backup (missing `state`)".to_string())
            }
            Self::BackupNotFound { .. }
            | Self::Sync(SyncError::Json(_) | SyncError::Io(_))
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_errors_share_exit_code() {
        let err = Error::from(SyncError::RemoteUnavailable("timeout".into()));
        assert_eq!(err.exit_code(), 6);
        assert!(err.error_code().is_retryable());
        assert_eq!(err.to_string(), "Remote store unavailable: timeout");
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::InvalidDate("1403-05".into());
        let json = err.to_structured_json();

        assert_eq!(json["error"]["code"], "INVALID_DATE");
        assert_eq!(json["error"]["exit_code"], 4);
        assert!(json["error"]["hint"].as_str().unwrap().contains("YEAR/MONTH/DAY"));
    }

    #[test]
    fn test_rejected_token_is_not_retryable() {
        let err = Error::from(SyncError::Unauthorized("401".into()));
        assert_eq!(err.error_code().as_str(), "UNAUTHORIZED");
        assert_eq!(err.exit_code(), 6);
        assert!(!err.error_code().is_retryable());
        assert!(err.hint().unwrap().contains("--token"));
    }

    #[test]
    fn test_io_error_has_no_hint() {
        let err = Error::Io(std::io::Error::other("disk"));
        assert!(err.hint().is_none());
        assert!(!err.error_code().is_retryable());
    }
}
