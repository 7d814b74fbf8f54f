//! Two-step confirmation for destructive changes.
//!
//! [`Store::request_change`] describes a change and hands back a token bound
//! to both the change and the current state. [`Store::apply_change`] only
//! goes through with the same change and a token that still matches, so a
//! confirmation issued before the data moved on is rejected.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::{Scope, Store};
use crate::error::{Error, Result};
use crate::model::{AppState, DefaultView, ReportSettings, Versioned};
use crate::sync::hash::{content_hash, snapshot_hash};

const TOKEN_LEN: usize = 12;

/// A change that needs explicit confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum SettingChange {
    SetDefaultView { view: DefaultView },
    ResetReportSettings,
    /// Tombstone every live record in scope.
    ResetData { scope: Scope },
}

impl SettingChange {
    /// Human-readable summary for confirmation prompts.
    #[must_use]
    pub fn describe(&self, state: &AppState) -> String {
        match self {
            Self::SetDefaultView { view } => format!(
                "Change default report view from {} to {view}",
                state.settings.default_view
            ),
            Self::ResetReportSettings => "Reset report settings to defaults".to_string(),
            Self::ResetData { scope } => {
                let n = state.data.live_transactions(scope).count() + state.data.live_tasks(scope).count();
                format!("Delete {n} record(s) in {scope}")
            }
        }
    }
}

/// First half of a confirmed change.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRequest {
    #[serde(flatten)]
    pub change: SettingChange,
    pub description: String,
    pub token: String,
}

fn confirmation_token(change: &SettingChange, state: &AppState) -> String {
    let mut token = content_hash(&(change, snapshot_hash(&state.data), &state.settings));
    token.truncate(TOKEN_LEN);
    token
}

impl Store {
    /// Describe `change` and issue a token for [`Store::apply_change`].
    #[must_use]
    pub fn request_change(&self, change: SettingChange) -> ChangeRequest {
        let state = self.state();
        ChangeRequest {
            description: change.describe(&state),
            token: confirmation_token(&change, &state),
            change,
        }
    }

    /// Apply a confirmed change. Returns whether the state changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfirmationMismatch`] if `token` was not issued for
    /// this change against the current state.
    pub fn apply_change(&self, change: &SettingChange, token: &str) -> Result<bool> {
        let mut mismatch = None;
        let changed = self.modify(|state, stamper| {
            let expected = confirmation_token(change, state);
            if expected != token {
                mismatch = Some(expected);
                return false;
            }
            match change {
                SettingChange::SetDefaultView { view } => {
                    if state.settings.default_view == *view {
                        return false;
                    }
                    Arc::make_mut(state).settings.default_view = *view;
                    true
                }
                SettingChange::ResetReportSettings => {
                    if state.settings == ReportSettings::default() {
                        return false;
                    }
                    Arc::make_mut(state).settings = ReportSettings::default();
                    true
                }
                SettingChange::ResetData { scope } => tombstone_scope(state, scope, stamper.stamp()),
            }
        });

        if let Some(expected) = mismatch {
            return Err(Error::ConfirmationMismatch { expected });
        }
        info!(?change, changed, "Applied confirmed change");
        Ok(changed)
    }
}

fn tombstone_scope(state: &mut Arc<AppState>, scope: &Scope, stamp: i64) -> bool {
    let targets: Vec<(String, String, String)> = state
        .data
        .days()
        .filter(|(y, m, d, day)| {
            scope.contains(y, m, d)
                && (day.transactions.iter().any(|t| !t.is_deleted())
                    || day.tasks.iter().any(|t| !t.is_deleted()))
        })
        .map(|(y, m, d, _)| (y.to_string(), m.to_string(), d.to_string()))
        .collect();
    if targets.is_empty() {
        return false;
    }

    let data = &mut Arc::make_mut(state).data;
    for (y, m, d) in &targets {
        if let Some(day) = data.day_mut(y, m, d) {
            for tx in day.transactions.iter_mut().filter(|t| !t.is_deleted()) {
                tx.mark_deleted(stamp);
            }
            for task in day.tasks.iter_mut().filter(|t| !t.is_deleted()) {
                task.mark_deleted(stamp);
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Task, Transaction, TransactionKind};
    use rust_decimal::Decimal;

    fn seeded() -> Store {
        let store = Store::new(AppState::default());
        store.add_transaction(
            "1403",
            "05",
            "12",
            Transaction::new(Decimal::from(5), TransactionKind::Expense, "1403/05/12"),
        );
        store.add_task("1403", "05", "12", Task::new("keep me"));
        store.add_task("1403", "06", "01", Task::new("other month"));
        store
    }

    #[test]
    fn test_set_default_view_two_step() {
        let store = seeded();
        let change = SettingChange::SetDefaultView { view: DefaultView::Yearly };

        let request = store.request_change(change.clone());
        assert!(request.description.contains("monthly"));
        assert_eq!(request.token.len(), TOKEN_LEN);

        assert!(store.apply_change(&change, &request.token).unwrap());
        assert_eq!(store.state().settings.default_view, DefaultView::Yearly);
    }

    #[test]
    fn test_stale_token_is_rejected() {
        let store = seeded();
        let change = SettingChange::ResetData { scope: Scope::All };
        let request = store.request_change(change.clone());

        store.add_task("1403", "05", "13", Task::new("late"));
        let before = store.state();

        let err = store.apply_change(&change, &request.token).unwrap_err();
        assert!(matches!(err, Error::ConfirmationMismatch { .. }));
        assert!(Arc::ptr_eq(&before, &store.state()));
    }

    #[test]
    fn test_token_is_bound_to_change() {
        let store = seeded();
        let request = store.request_change(SettingChange::ResetReportSettings);
        let other = SettingChange::ResetData { scope: Scope::All };

        assert!(store.apply_change(&other, &request.token).is_err());
    }

    #[test]
    fn test_reset_data_tombstones_scope_only() {
        let store = seeded();
        let change = SettingChange::ResetData { scope: Scope::month("1403", "05") };
        let request = store.request_change(change.clone());
        assert!(request.description.contains("2 record(s)"));

        assert!(store.apply_change(&change, &request.token).unwrap());

        assert!(store.tasks_by_month("1403", "05").is_empty());
        assert!(store.transactions_by_month("1403", "05").is_empty());
        assert_eq!(store.tasks_by_month("1403", "06").len(), 1);
        // Records stay as tombstones so the deletion can sync.
        assert_eq!(store.state().data.tombstone_count(), 2);
    }

    #[test]
    fn test_reset_report_settings_noop_when_default() {
        let store = seeded();
        let request = store.request_change(SettingChange::ResetReportSettings);
        assert!(!store.apply_change(&SettingChange::ResetReportSettings, &request.token).unwrap());
    }
}
