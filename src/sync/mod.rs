//! Remote sync.
//!
//! Local data is mirrored to a single JSON document in a remote store
//! (a GitHub gist by default):
//!
//! - **Codec**: Backup envelope encode/decode with schema migrations
//! - **Merge**: Per-record last-write-wins with tombstone rules
//! - **GC**: Expired tombstones are dropped from everything pushed
//! - **Hashing**: SHA256 content hashing for change detection
//! - **Engine**: Debounced push, periodic pull, manual sync
//!
//! # Document Format
//!
//! ```json
//! {"state":{"userName":"...","data":{"1403":{"05":{"12":{"transactions":[],"tasks":[]}}}}},"version":1}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use daybook::sync::{GistStore, SyncEngine};
//!
//! let remote = GistStore::new(&config.api_url, config.request_timeout)?;
//! let engine = SyncEngine::new(store, remote, config, meta);
//! let report = engine.sync_now().await?;
//! ```

pub mod codec;
pub mod engine;
pub mod gc;
pub mod gist;
pub mod hash;
#[cfg(test)]
mod memory;
pub mod merge;
pub mod migrations;
pub mod remote;
mod types;

pub use engine::SyncEngine;
pub use gist::GistStore;
pub use hash::{content_hash, has_changed, snapshot_hash};
pub use remote::{CreatedDocument, Owner, RemoteDocument, RemoteStore, RemoteTarget};
pub use types::{
    ConflictPolicy, ConflictPrompt, GcStats, MergeStats, Resolution, SyncAction, SyncError,
    SyncReport, SyncResult, SyncState, SyncStatus,
};
