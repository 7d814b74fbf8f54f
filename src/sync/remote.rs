//! Remote document store interface.
//!
//! The remote holds one JSON file (the backup envelope) inside one document.
//! Implementations only move text; decoding and merging happen in the engine.

use std::future::Future;

use super::types::SyncResult;
use crate::model::AppState;

/// Default file name inside the remote document.
pub const DEFAULT_FILENAME: &str = "daybook.json";

/// Where to read and write the envelope, plus the credential to do it with.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub token: String,
    /// Empty until the first push creates the document
    pub document_id: String,
    pub filename: String,
}

impl RemoteTarget {
    /// Build a target from the store's scalar fields.
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        let filename = if state.filename.is_empty() {
            DEFAULT_FILENAME.to_string()
        } else {
            state.filename.clone()
        };
        Self {
            token: state.token.clone(),
            document_id: state.gist_id.clone(),
            filename,
        }
    }

    #[must_use]
    pub fn has_document(&self) -> bool {
        !self.document_id.is_empty()
    }
}

impl std::fmt::Debug for RemoteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteTarget")
            .field("token", &"<redacted>")
            .field("document_id", &self.document_id)
            .field("filename", &self.filename)
            .finish()
    }
}

/// Account that owns the remote document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owner {
    pub login: Option<String>,
    pub avatar_url: Option<String>,
}

/// Result of a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteDocument {
    /// File content; `None` when the document has no such file.
    pub content: Option<String>,
    pub owner: Option<Owner>,
}

/// Result of a create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDocument {
    pub id: String,
    pub url: String,
}

/// A remote document store.
pub trait RemoteStore: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fetch the file named by `target`.
    ///
    /// Fails with `NoRemoteDocument` when the document does not exist.
    fn fetch(&self, target: &RemoteTarget) -> impl Future<Output = SyncResult<RemoteDocument>> + Send;

    /// Replace the file's content in an existing document.
    fn update(&self, target: &RemoteTarget, content: &str) -> impl Future<Output = SyncResult<()>> + Send;

    /// Create a new document holding the file. `target.document_id` is ignored.
    fn create(
        &self,
        target: &RemoteTarget,
        content: &str,
    ) -> impl Future<Output = SyncResult<CreatedDocument>> + Send;
}
