//! Tombstone garbage collection.
//!
//! Soft-deleted records stay in the snapshot so the deletion can reach other
//! replicas. Once a tombstone is older than the retention window it is
//! dropped from the outbound copy before a push. The locally held snapshot
//! is never collected here; queries filter tombstones on the fly.

use std::time::Duration;

use tracing::debug;

use super::types::GcStats;
use crate::model::{Snapshot, Versioned};

/// Default tombstone retention.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Return a copy of `snapshot` without tombstones older than `now - retention`.
///
/// Only days that actually lose records are copied; everything else stays
/// shared with the input. Containers are kept even when collection empties
/// them.
#[must_use]
pub fn collect(snapshot: &Snapshot, retention: Duration, now: i64) -> (Snapshot, GcStats) {
    let retention_ms = i64::try_from(retention.as_millis()).unwrap_or(i64::MAX);
    let cutoff = now.saturating_sub(retention_ms);
    let expired = |item: &dyn ExpiryProbe| item.deleted_before(cutoff);

    let doomed: Vec<(String, String, String)> = snapshot
        .days()
        .filter(|(_, _, _, day)| {
            day.transactions.iter().any(|t| expired(t)) || day.tasks.iter().any(|t| expired(t))
        })
        .map(|(y, m, d, _)| (y.to_string(), m.to_string(), d.to_string()))
        .collect();

    let mut stats = GcStats::default();
    if doomed.is_empty() {
        return (snapshot.clone(), stats);
    }

    let mut out = snapshot.clone();
    for (y, m, d) in &doomed {
        if let Some(day) = out.day_mut(y, m, d) {
            let before = (day.transactions.len(), day.tasks.len());
            day.transactions.retain(|t| !expired(t));
            day.tasks.retain(|t| !expired(t));
            stats.transactions += before.0 - day.transactions.len();
            stats.tasks += before.1 - day.tasks.len();
        }
    }

    debug!(
        transactions = stats.transactions,
        tasks = stats.tasks,
        cutoff,
        "Collected tombstones"
    );
    (out, stats)
}

trait ExpiryProbe {
    fn deleted_before(&self, cutoff: i64) -> bool;
}

impl<T: Versioned> ExpiryProbe for T {
    fn deleted_before(&self, cutoff: i64) -> bool {
        self.deleted_at().is_some_and(|d| d < cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MonthData, Task, Transaction, TransactionKind};
    use rust_decimal::Decimal;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn tx(id: &str, deleted_at: Option<i64>) -> Transaction {
        let mut tx = Transaction::new(Decimal::ONE, TransactionKind::Income, "d").with_id(id);
        tx.updated_at = 1;
        tx.deleted_at = deleted_at;
        tx
    }

    fn task(id: &str, deleted_at: Option<i64>) -> Task {
        let mut task = Task::new(id).with_id(id);
        task.updated_at = 1;
        task.deleted_at = deleted_at;
        task
    }

    #[test]
    fn test_collect_drops_only_expired_tombstones() {
        let now = 100 * DAY_MS;
        let mut snapshot = Snapshot::new();
        let day = snapshot.ensure_day("1403", "01", "01");
        day.transactions.push(tx("live", None));
        day.transactions.push(tx("old", Some(now - 31 * DAY_MS)));
        day.transactions.push(tx("fresh", Some(now - 29 * DAY_MS)));
        day.tasks.push(task("old-task", Some(now - 90 * DAY_MS)));
        day.tasks.push(task("live-task", None));

        let (out, stats) = collect(&snapshot, DEFAULT_RETENTION, now);

        assert_eq!(stats, GcStats { transactions: 1, tasks: 1 });
        let day = out.day("1403", "01", "01").unwrap();
        let ids: Vec<_> = day.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["live", "fresh"]);
        assert_eq!(day.tasks.len(), 1);
        assert_eq!(day.tasks[0].id, "live-task");

        // Input is untouched.
        assert_eq!(snapshot.record_count(), 5);
    }

    #[test]
    fn test_no_expired_tombstones_returns_equal_copy() {
        let mut snapshot = Snapshot::new();
        snapshot.ensure_day("1403", "01", "01").transactions.push(tx("a", Some(50)));

        let (out, stats) = collect(&snapshot, Duration::from_secs(1), 100);
        assert!(stats.is_empty());
        assert_eq!(out, snapshot);
    }

    #[test]
    fn test_untouched_days_stay_shared() {
        let now = 100 * DAY_MS;
        let mut snapshot = Snapshot::new();
        snapshot.ensure_day("1403", "01", "01").tasks.push(task("old", Some(0)));
        snapshot.ensure_day("1403", "02", "01").tasks.push(task("live", None));

        let (out, stats) = collect(&snapshot, DEFAULT_RETENTION, now);
        assert_eq!(stats.total(), 1);

        let feb = |s: &Snapshot| s.month("1403", "02").unwrap() as *const MonthData;
        assert!(std::ptr::eq(feb(&snapshot), feb(&out)));
    }

    #[test]
    fn test_emptied_day_is_kept() {
        let mut snapshot = Snapshot::new();
        snapshot.ensure_day("1403", "01", "01").tasks.push(task("old", Some(0)));

        let (out, stats) = collect(&snapshot, DEFAULT_RETENTION, 100 * DAY_MS);

        assert_eq!(stats.tasks, 1);
        let day = out.day("1403", "01", "01").unwrap();
        assert!(day.tasks.is_empty() && day.transactions.is_empty());
    }

    #[test]
    fn test_zero_retention_collects_all_past_tombstones() {
        let mut snapshot = Snapshot::new();
        snapshot.ensure_day("1403", "01", "01").tasks.push(task("a", Some(99)));
        snapshot.ensure_day("1403", "01", "01").tasks.push(task("b", Some(100)));

        let (out, stats) = collect(&snapshot, Duration::ZERO, 100);
        assert_eq!(stats.tasks, 1);
        assert_eq!(out.day("1403", "01", "01").unwrap().tasks[0].id, "b");
    }
}
