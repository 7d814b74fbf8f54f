//! Per-record merge of two snapshots.
//!
//! Keys are unioned at every level (year, month, day); a node missing on one
//! side counts as empty, never as a deletion. Within a day, transactions and
//! tasks are matched by id:
//!
//! | local            | remote           | winner                                   |
//! |------------------|------------------|------------------------------------------|
//! | only             | -                | local                                    |
//! | -                | only             | remote                                   |
//! | tombstone `a`    | tombstone `b`    | later of `a`/`b`, remote on ties         |
//! | tombstone `a`    | live, edited `u` | tombstone iff `a >= u`, else remote      |
//! | live, edited `u` | tombstone `b`    | tombstone iff `b >= u`, else local       |
//! | live `u`         | live `v`         | greater of `u`/`v`, remote on ties       |
//!
//! A live record beating a tombstone is a resurrection: the delete happened
//! before the other side's last edit.
//!
//! Merged lists keep local order with winners replaced in place, followed by
//! remote-only records in remote order.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use super::types::MergeStats;
use crate::model::{DayData, MonthData, Snapshot, Versioned, YearData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Local,
    Remote,
}

/// Merge `remote` into `local`.
#[must_use]
pub fn merge(local: &Snapshot, remote: &Snapshot) -> (Snapshot, MergeStats) {
    let mut stats = MergeStats::default();
    let mut out = Snapshot::new();

    let years: BTreeSet<&str> = local.years().chain(remote.years()).map(|(k, _)| k).collect();
    for year in years {
        let merged = match (local.year(year), remote.year(year)) {
            (Some(l), Some(r)) => merge_year(l, r, &mut stats),
            (Some(l), None) => {
                stats.from_local += year_len(l);
                l.clone()
            }
            (None, Some(r)) => {
                stats.from_remote += year_len(r);
                r.clone()
            }
            (None, None) => continue,
        };
        out.insert(year, merged);
    }

    debug!(
        from_local = stats.from_local,
        from_remote = stats.from_remote,
        conflicts = stats.conflicts,
        resurrected = stats.resurrected,
        "Merged snapshots"
    );
    (out, stats)
}

fn merge_year(local: &YearData, remote: &YearData, stats: &mut MergeStats) -> YearData {
    let mut out = YearData::default();
    let months: BTreeSet<&str> = local.months().chain(remote.months()).map(|(k, _)| k).collect();
    for month in months {
        let merged = match (local.month(month), remote.month(month)) {
            (Some(l), Some(r)) => merge_month(l, r, stats),
            (Some(l), None) => {
                stats.from_local += month_len(l);
                l.clone()
            }
            (None, Some(r)) => {
                stats.from_remote += month_len(r);
                r.clone()
            }
            (None, None) => continue,
        };
        out.insert(month, merged);
    }
    out
}

fn merge_month(local: &MonthData, remote: &MonthData, stats: &mut MergeStats) -> MonthData {
    let mut out = MonthData::default();
    let days: BTreeSet<&str> = local.days().chain(remote.days()).map(|(k, _)| k).collect();
    for day in days {
        let merged = match (local.day(day), remote.day(day)) {
            (Some(l), Some(r)) => merge_day(l, r, stats),
            (Some(l), None) => {
                stats.from_local += l.len();
                l.clone()
            }
            (None, Some(r)) => {
                stats.from_remote += r.len();
                r.clone()
            }
            (None, None) => continue,
        };
        out.insert(day, merged);
    }
    out
}

fn merge_day(local: &DayData, remote: &DayData, stats: &mut MergeStats) -> DayData {
    if local == remote {
        stats.from_local += local.len();
        return local.clone();
    }
    DayData {
        transactions: merge_records(&local.transactions, &remote.transactions, stats),
        tasks: merge_records(&local.tasks, &remote.tasks, stats),
    }
}

fn merge_records<T: Versioned + PartialEq>(local: &[T], remote: &[T], stats: &mut MergeStats) -> Vec<T> {
    let remote_by_id: HashMap<&str, &T> = remote.iter().map(|r| (r.id(), r)).collect();
    let local_ids: HashSet<&str> = local.iter().map(Versioned::id).collect();
    let mut out = Vec::with_capacity(local.len().max(remote.len()));

    for l in local {
        let Some(&r) = remote_by_id.get(l.id()) else {
            stats.from_local += 1;
            out.push(l.clone());
            continue;
        };
        if l == r {
            stats.from_local += 1;
            out.push(l.clone());
            continue;
        }

        stats.conflicts += 1;
        let (side, resurrected) = resolve(l, r);
        if resurrected {
            stats.resurrected += 1;
        }
        match side {
            Side::Local => {
                stats.from_local += 1;
                out.push(l.clone());
            }
            Side::Remote => {
                stats.from_remote += 1;
                out.push(r.clone());
            }
        }
    }

    for r in remote.iter().filter(|r| !local_ids.contains(r.id())) {
        stats.from_remote += 1;
        out.push(r.clone());
    }
    out
}

/// Pick the winning side for one id. The flag is set on resurrection.
fn resolve<T: Versioned>(local: &T, remote: &T) -> (Side, bool) {
    match (local.deleted_at(), remote.deleted_at()) {
        (Some(l), Some(r)) => (if l > r { Side::Local } else { Side::Remote }, false),
        (Some(l), None) if l >= remote.updated_at() => (Side::Local, false),
        (Some(_), None) => (Side::Remote, true),
        (None, Some(r)) if r >= local.updated_at() => (Side::Remote, false),
        (None, Some(_)) => (Side::Local, true),
        (None, None) if local.updated_at() > remote.updated_at() => (Side::Local, false),
        (None, None) => (Side::Remote, false),
    }
}

fn month_len(month: &MonthData) -> usize {
    month.days().map(|(_, d)| d.len()).sum()
}

fn year_len(year: &YearData) -> usize {
    year.months().map(|(_, m)| month_len(m)).sum()
}
