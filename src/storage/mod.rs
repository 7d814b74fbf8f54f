//! Local persistence for Daybook.
//!
//! The whole state lives in a single JSON file that is rewritten atomically
//! after every change.
//!
//! # Submodules
//!
//! - [`file`] - Atomic file writes
//! - [`state_file`] - Load/save of the local state file

pub mod file;
pub mod state_file;

pub use file::atomic_write;
pub use state_file::{LocalState, StateFile, SyncMeta};
