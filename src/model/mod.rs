//! Data models for Daybook.
//!
//! This module contains all domain models:
//! - Transaction (income / expense entries)
//! - Task (per-day to-do items)
//! - Snapshot (year → month → day hierarchy)
//! - Backup (versioned envelope for sync and local persistence)

pub mod backup;
pub mod snapshot;
pub mod task;
pub mod transaction;

pub use backup::{AppState, Backup, DefaultView, ReportSettings, CURRENT_VERSION};
pub use snapshot::{DayData, MonthData, Snapshot, Summary, YearData};
pub use task::{Task, TaskPatch};
pub use transaction::{Transaction, TransactionKind, TransactionPatch};

/// Records that carry sync metadata.
///
/// Every record has a stable id, an `updated_at` stamp written on each
/// mutation, and an optional `deleted_at` tombstone marker.
pub trait Versioned: Clone {
    /// Stable identifier, unique across the whole snapshot.
    fn id(&self) -> &str;

    /// Last mutation stamp (Unix milliseconds).
    fn updated_at(&self) -> i64;

    /// Tombstone stamp, if the record is soft-deleted.
    fn deleted_at(&self) -> Option<i64>;

    /// Stamp the record as deleted.
    fn mark_deleted(&mut self, stamp: i64);

    /// Whether the record is a tombstone.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}
