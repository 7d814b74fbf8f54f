//! Local mutation store.
//!
//! [`Store`] is a cheap, cloneable handle over the canonical in-process
//! [`AppState`]. The state lives in a `tokio::sync::watch` channel as an
//! `Arc<AppState>`:
//!
//! - Readers call [`Store::state`] and get an immutable `Arc` they can hold
//!   for as long as they like.
//! - Mutations run under the channel's write lock and copy only the touched
//!   path of the hierarchy (see [`crate::model::snapshot`]), then publish the
//!   new state in one step. A reader never sees a half-applied change.
//! - Subscribers ([`Store::subscribe`]) are woken after every change; the
//!   sync engine and the persister both hang off this.
//!
//! Operations on a missing year/month/day/id are no-ops: they return `false`
//! and do not notify subscribers.
//!
//! # Submodules
//!
//! - [`query`] - Read-side queries and summaries
//! - [`confirm`] - Two-step confirmation for destructive changes

pub mod confirm;
pub mod query;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::clock::{Clock, Stamper, SystemClock};
use crate::model::{
    AppState, Backup, DayData, Snapshot, Task, TaskPatch, Transaction, TransactionPatch,
    Versioned,
};

use crate::sync::merge::merge;
use crate::sync::MergeStats;

pub use confirm::{ChangeRequest, SettingChange};
pub use query::Scope;

/// Handle to the shared application state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    tx: watch::Sender<Arc<AppState>>,
    stamper: Stamper,
}

/// Scalar profile fields to update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub user_name: Option<String>,
    pub language: Option<String>,
    pub selected_date: Option<String>,
    pub default_date: Option<String>,
    pub token: Option<String>,
    pub gist_id: Option<String>,
    pub filename: Option<String>,
    pub sync_enabled: Option<bool>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// Returns true if the update sets nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none()
            && self.language.is_none()
            && self.selected_date.is_none()
            && self.default_date.is_none()
            && self.token.is_none()
            && self.gist_id.is_none()
            && self.filename.is_none()
            && self.sync_enabled.is_none()
            && self.avatar_url.is_none()
    }
}

impl Store {
    /// Create a store over `state` using the system clock.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self::with_clock(state, Arc::new(SystemClock))
    }

    /// Create a store with a custom clock.
    #[must_use]
    pub fn with_clock(state: AppState, clock: Arc<dyn Clock>) -> Self {
        let stamper = Stamper::new(clock);
        if let Some(max) = state.data.max_stamp() {
            stamper.observe(max);
        }
        let (tx, _rx) = watch::channel(Arc::new(state));
        Self {
            inner: Arc::new(Inner { tx, stamper }),
        }
    }

    /// Current state. Cheap: clones an `Arc`.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        self.inner.tx.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.inner.tx.subscribe()
    }

    pub fn stamper(&self) -> &Stamper {
        &self.inner.stamper
    }

    /// Run `f` under the write lock; subscribers are notified iff it returns `true`.
    fn modify(&self, f: impl FnOnce(&mut Arc<AppState>, &Stamper) -> bool) -> bool {
        let stamper = &self.inner.stamper;
        self.inner.tx.send_if_modified(|state| f(state, stamper))
    }

    // ── Containers ───────────────────────────────────────────

    /// Ensure a year node exists. Idempotent.
    pub fn create_year(&self, year: &str) -> bool {
        self.modify(|state, _| {
            if state.data.year(year).is_some() {
                return false;
            }
            Arc::make_mut(state).data.ensure_year(year);
            true
        })
    }

    /// Ensure year and month nodes exist. Idempotent.
    pub fn create_month(&self, year: &str, month: &str) -> bool {
        self.modify(|state, _| {
            if state.data.month(year, month).is_some() {
                return false;
            }
            Arc::make_mut(state).data.ensure_month(year, month);
            true
        })
    }

    // ── Transactions ─────────────────────────────────────────

    /// Add a transaction to a day, creating containers as needed.
    ///
    /// Assigns a fresh id when the transaction has none (or one already in
    /// use), stamps `updated_at` and clears `deleted_at`. Returns the id.
    pub fn add_transaction(&self, year: &str, month: &str, day: &str, tx: Transaction) -> String {
        let mut added = String::new();
        self.modify(|state, stamper| {
            let id = fresh_id(&state.data, &tx.id);
            let record = Transaction {
                id: id.clone(),
                updated_at: stamper.stamp(),
                deleted_at: None,
                ..tx
            };
            Arc::make_mut(state).data.ensure_day(year, month, day).transactions.push(record);
            added = id;
            true
        });
        debug!(id = %added, year, month, day, "Transaction added");
        added
    }

    /// Apply a patch to a live transaction.
    pub fn edit_transaction(
        &self,
        year: &str,
        month: &str,
        day: &str,
        id: &str,
        patch: &TransactionPatch,
    ) -> bool {
        let changed = self.update_record(
            (year, month, day),
            id,
            |d| &d.transactions,
            |d| &mut d.transactions,
            |tx, stamp| {
                tx.apply(patch);
                tx.updated_at = stamp;
            },
        );
        debug!(id, changed, "Transaction edited");
        changed
    }

    /// Soft-delete a transaction.
    pub fn remove_transaction(&self, year: &str, month: &str, day: &str, id: &str) -> bool {
        let changed = self.update_record(
            (year, month, day),
            id,
            |d| &d.transactions,
            |d| &mut d.transactions,
            |tx, stamp| tx.mark_deleted(stamp),
        );
        debug!(id, changed, "Transaction removed");
        changed
    }

    /// Undo a soft-delete. The restore is a fresh edit, so it out-ranks the
    /// tombstone on every replica.
    pub fn restore_transaction(&self, year: &str, month: &str, day: &str, id: &str) -> bool {
        self.restore_record((year, month, day), id, |d| &d.transactions, |d| &mut d.transactions)
    }

    // ── Tasks ────────────────────────────────────────────────

    /// Add a task to a day, creating containers as needed. Returns the id.
    pub fn add_task(&self, year: &str, month: &str, day: &str, task: Task) -> String {
        let mut added = String::new();
        self.modify(|state, stamper| {
            let id = fresh_id(&state.data, &task.id);
            let record = Task {
                id: id.clone(),
                updated_at: stamper.stamp(),
                deleted_at: None,
                ..task
            };
            Arc::make_mut(state).data.ensure_day(year, month, day).tasks.push(record);
            added = id;
            true
        });
        debug!(id = %added, year, month, day, "Task added");
        added
    }

    /// Apply a patch to a live task.
    pub fn edit_task(&self, year: &str, month: &str, day: &str, id: &str, patch: &TaskPatch) -> bool {
        self.update_record(
            (year, month, day),
            id,
            |d| &d.tasks,
            |d| &mut d.tasks,
            |task, stamp| {
                task.apply(patch);
                task.updated_at = stamp;
            },
        )
    }

    /// Soft-delete a task.
    pub fn remove_task(&self, year: &str, month: &str, day: &str, id: &str) -> bool {
        self.update_record(
            (year, month, day),
            id,
            |d| &d.tasks,
            |d| &mut d.tasks,
            |task, stamp| task.mark_deleted(stamp),
        )
    }

    pub fn restore_task(&self, year: &str, month: &str, day: &str, id: &str) -> bool {
        self.restore_record((year, month, day), id, |d| &d.tasks, |d| &mut d.tasks)
    }

    /// Flip a task's completion flag.
    pub fn toggle_task_done(&self, year: &str, month: &str, day: &str, id: &str) -> bool {
        self.update_record(
            (year, month, day),
            id,
            |d| &d.tasks,
            |d| &mut d.tasks,
            |task, stamp| {
                task.is_done = !task.is_done;
                task.updated_at = stamp;
            },
        )
    }

    /// Locate a live record by id within one day and mutate it with a fresh stamp.
    fn update_record<T: Versioned>(
        &self,
        (year, month, day): (&str, &str, &str),
        id: &str,
        list: fn(&DayData) -> &Vec<T>,
        list_mut: fn(&mut DayData) -> &mut Vec<T>,
        f: impl FnOnce(&mut T, i64),
    ) -> bool {
        self.modify(|state, stamper| {
            let Some(idx) = state
                .data
                .day(year, month, day)
                .and_then(|d| list(d).iter().position(|r| r.id() == id && !r.is_deleted()))
            else {
                return false;
            };
            let Some(day_data) = Arc::make_mut(state).data.day_mut(year, month, day) else {
                return false;
            };
            f(&mut list_mut(day_data)[idx], stamper.stamp());
            true
        })
    }

    fn restore_record<T: Versioned + Restorable>(
        &self,
        (year, month, day): (&str, &str, &str),
        id: &str,
        list: fn(&DayData) -> &Vec<T>,
        list_mut: fn(&mut DayData) -> &mut Vec<T>,
    ) -> bool {
        self.modify(|state, stamper| {
            let Some(idx) = state
                .data
                .day(year, month, day)
                .and_then(|d| list(d).iter().position(|r| r.id() == id && r.is_deleted()))
            else {
                return false;
            };
            let Some(day_data) = Arc::make_mut(state).data.day_mut(year, month, day) else {
                return false;
            };
            list_mut(day_data)[idx].restore(stamper.stamp());
            true
        })
    }

    // ── Profile ──────────────────────────────────────────────

    /// Update scalar profile fields.
    pub fn update_profile(&self, update: &ProfileUpdate) -> bool {
        self.modify(|state, _| {
            let current: &AppState = state;
            let mut next = current.clone();
            let set = |field: &mut String, value: &Option<String>| {
                if let Some(v) = value {
                    field.clone_from(v);
                }
            };
            set(&mut next.user_name, &update.user_name);
            set(&mut next.language, &update.language);
            set(&mut next.selected_date, &update.selected_date);
            set(&mut next.default_date, &update.default_date);
            set(&mut next.token, &update.token);
            set(&mut next.gist_id, &update.gist_id);
            set(&mut next.filename, &update.filename);
            set(&mut next.avatar_url, &update.avatar_url);
            if let Some(enabled) = update.sync_enabled {
                next.sync_enabled = enabled;
            }
            if next == *current {
                return false;
            }
            *state = Arc::new(next);
            true
        })
    }

    /// Record the remote document handle returned by a create.
    pub fn set_gist_id(&self, gist_id: &str) -> bool {
        self.update_profile(&ProfileUpdate {
            gist_id: Some(gist_id.to_string()),
            ..ProfileUpdate::default()
        })
    }

    // ── Sync application ─────────────────────────────────────

    /// Replace the dataset, e.g. with a merge result.
    ///
    /// Scalar fields are untouched. Later local stamps will out-rank
    /// everything in `data`.
    pub fn replace_data(&self, data: Snapshot) -> bool {
        if let Some(max) = data.max_stamp() {
            self.inner.stamper.observe(max);
        }
        self.modify(|state, _| {
            if state.data == data {
                return false;
            }
            Arc::make_mut(state).data = data;
            true
        })
    }

    /// Replace the dataset with `data`, keeping edits made after `base` was read.
    ///
    /// Records that changed in the store since `base` are merged on top of
    /// `data`; everything else comes from `data` as-is.
    pub fn replace_data_since(&self, base: &Snapshot, data: Snapshot) -> bool {
        if let Some(max) = data.max_stamp() {
            self.inner.stamper.observe(max);
        }
        self.modify(|state, _| {
            let next = if state.data == *base {
                data
            } else {
                let edits = state.data.changes_since(base);
                debug!(records = edits.record_count(), "Keeping edits made during the pull");
                merge(&data, &edits).0
            };
            if state.data == next {
                return false;
            }
            Arc::make_mut(state).data = next;
            true
        })
    }

    /// Merge a pulled dataset into the current one under the write lock.
    ///
    /// The merge runs against whatever the store holds at that moment, so
    /// edits made while the remote copy was in flight take part in it.
    pub fn merge_remote(&self, remote: &Snapshot) -> (bool, MergeStats) {
        if let Some(max) = remote.max_stamp() {
            self.inner.stamper.observe(max);
        }
        let mut stats = MergeStats::default();
        let changed = self.modify(|state, _| {
            let (merged, merge_stats) = merge(&state.data, remote);
            stats = merge_stats;
            if merged == state.data {
                return false;
            }
            Arc::make_mut(state).data = merged;
            true
        });
        (changed, stats)
    }

    /// Load an already-migrated backup.
    ///
    /// Data is replaced. Each string field takes the backup's value when it
    /// is non-empty and keeps the current value otherwise; the sync flag is
    /// always taken from the backup.
    pub fn import_backup(&self, backup: Backup) -> bool {
        let incoming = backup.state;
        if let Some(max) = incoming.data.max_stamp() {
            self.inner.stamper.observe(max);
        }
        let changed = self.modify(|state, _| {
            let current: &AppState = state;
            let pick = |new: String, old: &str| if new.is_empty() { old.to_string() } else { new };
            let next = AppState {
                user_name: pick(incoming.user_name, &current.user_name),
                language: pick(incoming.language, &current.language),
                selected_date: pick(incoming.selected_date, &current.selected_date),
                default_date: pick(incoming.default_date, &current.default_date),
                token: pick(incoming.token, &current.token),
                gist_id: pick(incoming.gist_id, &current.gist_id),
                filename: pick(incoming.filename, &current.filename),
                sync_enabled: incoming.sync_enabled,
                avatar_url: pick(incoming.avatar_url, &current.avatar_url),
                settings: current.settings.clone(),
                data: incoming.data,
            };
            if next == *current {
                return false;
            }
            *state = Arc::new(next);
            true
        });
        if !changed {
            warn!("Imported backup is identical to local state");
        }
        changed
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("records", &self.state().data.record_count())
            .field("stamper", &self.inner.stamper)
            .finish()
    }
}

/// Keep a caller-supplied id unless it is empty or already taken.
fn fresh_id(data: &Snapshot, requested: &str) -> String {
    if requested.is_empty() {
        return uuid::Uuid::new_v4().to_string();
    }
    if data.contains_id(requested) {
        warn!(id = requested, "Id already in use, assigning a new one");
        return uuid::Uuid::new_v4().to_string();
    }
    requested.to_string()
}

/// Records whose tombstone can be lifted.
trait Restorable {
    fn restore(&mut self, stamp: i64);
}

impl Restorable for Transaction {
    fn restore(&mut self, stamp: i64) {
        self.deleted_at = None;
        self.updated_at = stamp;
    }
}

impl Restorable for Task {
    fn restore(&mut self, stamp: i64) {
        self.deleted_at = None;
        self.updated_at = stamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::TransactionKind;
    use rust_decimal::Decimal;

    fn store_at(ms: i64) -> (Store, Arc<ManualClock>) {
        let clock = ManualClock::at(ms);
        (Store::with_clock(AppState::default(), clock.clone()), clock)
    }

    fn income(amount: i64) -> Transaction {
        Transaction::new(Decimal::from(amount), TransactionKind::Income, "1403/05/12")
    }

    #[test]
    fn test_add_assigns_id_and_stamp() {
        let (store, _) = store_at(1_000);
        let id = store.add_transaction("1403", "05", "12", income(500));

        let state = store.state();
        let tx = &state.data.day("1403", "05", "12").unwrap().transactions[0];
        assert_eq!(tx.id, id);
        assert!(!id.is_empty());
        assert_eq!(tx.updated_at, 1_000);
        assert_eq!(tx.deleted_at, None);
    }

    #[test]
    fn test_add_clears_incoming_tombstone_and_keeps_unique_ids() {
        let (store, _) = store_at(1_000);
        let mut tx = income(1).with_id("fixed");
        tx.deleted_at = Some(5);

        let first = store.add_transaction("1403", "05", "12", tx.clone());
        let second = store.add_transaction("1403", "06", "01", tx);

        assert_eq!(first, "fixed");
        assert_ne!(second, "fixed");
        let state = store.state();
        assert!(state.data.day("1403", "05", "12").unwrap().transactions[0].deleted_at.is_none());
    }

    #[test]
    fn test_edit_overwrites_stamp() {
        let (store, clock) = store_at(1_000);
        let id = store.add_transaction("1403", "05", "12", income(500));
        clock.advance(10);

        let changed = store.edit_transaction(
            "1403",
            "05",
            "12",
            &id,
            &TransactionPatch {
                amount: Some(Decimal::from(100)),
                ..TransactionPatch::default()
            },
        );

        assert!(changed);
        let state = store.state();
        let tx = &state.data.day("1403", "05", "12").unwrap().transactions[0];
        assert_eq!(tx.amount, Decimal::from(100));
        assert_eq!(tx.updated_at, 1_010);
    }

    #[test]
    fn test_missing_targets_are_noops() {
        let (store, _) = store_at(1_000);
        let id = store.add_transaction("1403", "05", "12", income(500));
        let before = store.state();
        let mut rx = store.subscribe();

        assert!(!store.edit_transaction("1403", "05", "13", &id, &TransactionPatch::default()));
        assert!(!store.remove_transaction("1402", "05", "12", &id));
        assert!(!store.remove_transaction("1403", "05", "12", "nope"));
        assert!(!store.toggle_task_done("1403", "05", "12", &id));

        assert!(Arc::ptr_eq(&before, &store.state()));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_remove_is_soft_delete() {
        let (store, clock) = store_at(1_000);
        let id = store.add_transaction("1403", "05", "12", income(500));
        clock.advance(5);

        assert!(store.remove_transaction("1403", "05", "12", &id));
        // A second delete does not move the tombstone.
        clock.advance(5);
        assert!(!store.remove_transaction("1403", "05", "12", &id));

        let state = store.state();
        let tx = &state.data.day("1403", "05", "12").unwrap().transactions[0];
        assert_eq!(tx.deleted_at, Some(1_005));
        assert_eq!(tx.updated_at, 1_005);
        assert!(store.transactions_by_day("1403", "05", "12").is_empty());
    }

    #[test]
    fn test_restore_lifts_tombstone_with_newer_stamp() {
        let (store, clock) = store_at(1_000);
        let id = store.add_task("1403", "05", "12", Task::new("call"));
        store.remove_task("1403", "05", "12", &id);
        clock.advance(100);

        assert!(store.restore_task("1403", "05", "12", &id));
        assert!(!store.restore_task("1403", "05", "12", &id));

        let tasks = store.tasks_by_day("1403", "05", "12");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].updated_at, 1_100);
    }

    #[test]
    fn test_toggle_task_done_stamps() {
        let (store, clock) = store_at(1_000);
        let id = store.add_task("1403", "05", "12", Task::new("call"));
        clock.advance(1);

        assert!(store.toggle_task_done("1403", "05", "12", &id));
        let tasks = store.tasks_by_day("1403", "05", "12");
        assert!(tasks[0].is_done);
        assert_eq!(tasks[0].updated_at, 1_001);

        store.toggle_task_done("1403", "05", "12", &id);
        assert!(!store.tasks_by_day("1403", "05", "12")[0].is_done);
    }

    #[test]
    fn test_create_containers_idempotent() {
        let (store, _) = store_at(1_000);
        assert!(store.create_month("1403", "05"));
        assert!(!store.create_month("1403", "05"));
        assert!(!store.create_year("1403"));
        assert!(store.create_year("1404"));

        let state = store.state();
        assert!(state.data.month("1403", "05").unwrap().is_empty());
    }

    #[test]
    fn test_readers_keep_consistent_view() {
        let (store, _) = store_at(1_000);
        store.add_transaction("1403", "05", "12", income(1));
        let reader = store.state();

        store.add_transaction("1403", "05", "12", income(2));
        assert_eq!(reader.data.day("1403", "05", "12").unwrap().transactions.len(), 1);
        assert_eq!(store.state().data.day("1403", "05", "12").unwrap().transactions.len(), 2);
    }

    #[test]
    fn test_replace_data_advances_stamper() {
        let (store, _) = store_at(1_000);
        let mut data = Snapshot::new();
        let mut tx = income(1).with_id("remote");
        tx.updated_at = 9_000;
        data.ensure_day("1403", "05", "12").transactions.push(tx);

        assert!(store.replace_data(data.clone()));
        assert!(!store.replace_data(data));

        let id = store.add_task("1403", "05", "12", Task::new("after merge"));
        assert_eq!(store.tasks_by_day("1403", "05", "12")[0].id, id);
        assert!(store.tasks_by_day("1403", "05", "12")[0].updated_at > 9_000);
    }

    #[test]
    fn test_merge_remote_uses_current_data() {
        let (store, _) = store_at(1_000);
        let before = store.state();
        let local = store.add_task("1403", "05", "12", Task::new("added after read"));

        let mut remote = before.data.clone();
        let mut task = Task::new("remote").with_id("r1");
        task.updated_at = 500;
        remote.ensure_day("1403", "05", "12").tasks.push(task);

        let (changed, stats) = store.merge_remote(&remote);
        assert!(changed);
        assert_eq!(stats.from_remote, 1);
        let ids: Vec<_> = store.tasks_by_day("1403", "05", "12").into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![local, "r1".to_string()]);

        // Merging the same remote again changes nothing.
        let rx = store.subscribe();
        assert!(!store.merge_remote(&remote).0);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_replace_data_since_keeps_later_edits() {
        let (store, clock) = store_at(1_000);
        let old = store.add_task("1403", "05", "12", Task::new("old"));
        let base = store.state().data.clone();
        clock.advance(10);
        let later = store.add_task("1403", "05", "12", Task::new("later"));

        let mut remote = Snapshot::new();
        let mut task = Task::new("remote").with_id("r1");
        task.updated_at = 900;
        remote.ensure_day("1403", "05", "12").tasks.push(task);

        assert!(store.replace_data_since(&base, remote));
        let ids: Vec<_> = store.tasks_by_day("1403", "05", "12").into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["r1".to_string(), later]);
        assert!(!ids.contains(&old));
    }

    #[test]
    fn test_import_backup_keeps_non_empty_fields() {
        let (store, _) = store_at(1_000);
        store.update_profile(&ProfileUpdate {
            token: Some("local-token".into()),
            user_name: Some("local".into()),
            sync_enabled: Some(true),
            ..ProfileUpdate::default()
        });

        let mut incoming = AppState {
            user_name: "remote".into(),
            ..AppState::default()
        };
        incoming.data.ensure_day("1403", "01", "01");
        store.import_backup(Backup {
            state: incoming,
            version: crate::model::CURRENT_VERSION,
        });

        let state = store.state();
        assert_eq!(state.user_name, "remote");
        assert_eq!(state.token, "local-token");
        assert!(!state.sync_enabled);
        assert!(state.data.day("1403", "01", "01").is_some());
    }

    #[test]
    fn test_mutations_after_maximal_stamp_do_not_overflow() {
        let mut state = AppState::default();
        state.data.ensure_day("1403", "05", "12").tasks.push(Task {
            updated_at: i64::MAX,
            ..Task::new("far future").with_id("k1")
        });
        let store = Store::with_clock(state, ManualClock::at(1_000));

        let id = store.add_task("1403", "05", "12", Task::new("next"));
        assert!(store.toggle_task_done("1403", "05", "12", &id));

        let tasks = store.tasks_by_day("1403", "05", "12");
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.updated_at == i64::MAX));
    }

    #[test]
    fn test_update_profile_reports_changes() {
        let (store, _) = store_at(1_000);
        let update = ProfileUpdate {
            sync_enabled: Some(true),
            ..ProfileUpdate::default()
        };
        assert!(store.update_profile(&update));
        assert!(!store.update_profile(&update));
        assert!(store.set_gist_id("abc"));
        assert_eq!(store.state().gist_id, "abc");
    }
}
