//! Read-side queries.
//!
//! Queries flatten a subtree of the snapshot and drop tombstones. They are
//! defined on [`Snapshot`] so a reader holding an older `Arc<AppState>` can
//! run them against its own view; [`Store`] exposes owned copies for
//! convenience.

use serde::Serialize;

use super::Store;
use crate::model::{DayData, Snapshot, Summary, Task, Transaction, TransactionKind, Versioned};

/// A subtree of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum Scope {
    All,
    Year { year: String },
    Month { year: String, month: String },
    Day { year: String, month: String, day: String },
}

impl Scope {
    #[must_use]
    pub fn year(year: &str) -> Self {
        Self::Year { year: year.to_string() }
    }

    #[must_use]
    pub fn month(year: &str, month: &str) -> Self {
        Self::Month {
            year: year.to_string(),
            month: month.to_string(),
        }
    }

    #[must_use]
    pub fn day(year: &str, month: &str, day: &str) -> Self {
        Self::Day {
            year: year.to_string(),
            month: month.to_string(),
            day: day.to_string(),
        }
    }

    /// Whether the `(year, month, day)` path lies inside this scope.
    #[must_use]
    pub fn contains(&self, y: &str, m: &str, d: &str) -> bool {
        match self {
            Self::All => true,
            Self::Year { year } => year == y,
            Self::Month { year, month } => year == y && month == m,
            Self::Day { year, month, day } => year == y && month == m && day == d,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Year { year } => write!(f, "{year}"),
            Self::Month { year, month } => write!(f, "{year}/{month}"),
            Self::Day { year, month, day } => write!(f, "{year}/{month}/{day}"),
        }
    }
}

impl Snapshot {
    /// Day nodes inside `scope`, in key order.
    pub fn days_in<'a>(&'a self, scope: &'a Scope) -> impl Iterator<Item = &'a DayData> + 'a {
        self.days()
            .filter(move |(y, m, d, _)| scope.contains(y, m, d))
            .map(|(_, _, _, day)| day)
    }

    /// Live transactions inside `scope`.
    pub fn live_transactions<'a>(
        &'a self,
        scope: &'a Scope,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.days_in(scope)
            .flat_map(|day| day.transactions.iter())
            .filter(|tx| !tx.is_deleted())
    }

    /// Live tasks inside `scope`.
    pub fn live_tasks<'a>(&'a self, scope: &'a Scope) -> impl Iterator<Item = &'a Task> + 'a {
        self.days_in(scope)
            .flat_map(|day| day.tasks.iter())
            .filter(|task| !task.is_deleted())
    }

    #[must_use]
    pub fn summary(&self, scope: &Scope) -> Summary {
        Summary::from_transactions(self.live_transactions(scope))
    }
}

impl Store {
    #[must_use]
    pub fn transactions(&self, scope: &Scope) -> Vec<Transaction> {
        self.state().data.live_transactions(scope).cloned().collect()
    }

    #[must_use]
    pub fn tasks(&self, scope: &Scope) -> Vec<Task> {
        self.state().data.live_tasks(scope).cloned().collect()
    }

    #[must_use]
    pub fn transactions_by_day(&self, year: &str, month: &str, day: &str) -> Vec<Transaction> {
        self.transactions(&Scope::day(year, month, day))
    }

    #[must_use]
    pub fn transactions_by_month(&self, year: &str, month: &str) -> Vec<Transaction> {
        self.transactions(&Scope::month(year, month))
    }

    #[must_use]
    pub fn transactions_by_year(&self, year: &str) -> Vec<Transaction> {
        self.transactions(&Scope::year(year))
    }

    #[must_use]
    pub fn tasks_by_day(&self, year: &str, month: &str, day: &str) -> Vec<Task> {
        self.tasks(&Scope::day(year, month, day))
    }

    #[must_use]
    pub fn tasks_by_month(&self, year: &str, month: &str) -> Vec<Task> {
        self.tasks(&Scope::month(year, month))
    }

    #[must_use]
    pub fn tasks_by_year(&self, year: &str) -> Vec<Task> {
        self.tasks(&Scope::year(year))
    }

    /// Live income transactions of a year.
    #[must_use]
    pub fn income_by_year(&self, year: &str) -> Vec<Transaction> {
        self.by_kind(year, TransactionKind::Income)
    }

    /// Live expense transactions of a year.
    #[must_use]
    pub fn expenses_by_year(&self, year: &str) -> Vec<Transaction> {
        self.by_kind(year, TransactionKind::Expense)
    }

    fn by_kind(&self, year: &str, kind: TransactionKind) -> Vec<Transaction> {
        self.state()
            .data
            .live_transactions(&Scope::year(year))
            .filter(|tx| tx.kind == kind)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn summary_by_day(&self, year: &str, month: &str, day: &str) -> Summary {
        self.state().data.summary(&Scope::day(year, month, day))
    }

    #[must_use]
    pub fn summary_by_month(&self, year: &str, month: &str) -> Summary {
        self.state().data.summary(&Scope::month(year, month))
    }

    #[must_use]
    pub fn summary_by_year(&self, year: &str) -> Summary {
        self.state().data.summary(&Scope::year(year))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AppState;
    use rust_decimal::Decimal;

    fn tx(amount: i64, kind: TransactionKind) -> Transaction {
        Transaction::new(Decimal::from(amount), kind, "1403/05/12")
    }

    #[test]
    fn test_summary_excludes_tombstones() {
        let store = Store::new(AppState::default());
        store.add_transaction("1403", "05", "12", tx(500, TransactionKind::Income));
        store.add_transaction("1403", "05", "12", tx(200, TransactionKind::Expense));
        let dead = store.add_transaction("1403", "05", "12", tx(1000, TransactionKind::Income));
        store.remove_transaction("1403", "05", "12", &dead);

        let summary = store.summary_by_day("1403", "05", "12");
        assert_eq!(summary.income, Decimal::from(500));
        assert_eq!(summary.expense, Decimal::from(200));
        assert_eq!(summary.balance, Decimal::from(300));
    }

    #[test]
    fn test_queries_flatten_subtrees() {
        let store = Store::new(AppState::default());
        store.add_transaction("1403", "05", "01", tx(1, TransactionKind::Income));
        store.add_transaction("1403", "05", "20", tx(2, TransactionKind::Expense));
        store.add_transaction("1403", "06", "01", tx(3, TransactionKind::Income));
        store.add_transaction("1404", "01", "01", tx(4, TransactionKind::Income));
        store.add_task("1403", "05", "01", Task::new("a"));
        store.add_task("1403", "07", "01", Task::new("b"));

        assert_eq!(store.transactions_by_day("1403", "05", "01").len(), 1);
        assert_eq!(store.transactions_by_month("1403", "05").len(), 2);
        assert_eq!(store.transactions_by_year("1403").len(), 3);
        assert_eq!(store.tasks_by_month("1403", "05").len(), 1);
        assert_eq!(store.tasks_by_year("1403").len(), 2);
        assert_eq!(store.income_by_year("1403").len(), 2);
        assert_eq!(store.expenses_by_year("1403").len(), 1);
        assert_eq!(store.summary_by_year("1403").balance, Decimal::from(2));
        assert_eq!(store.transactions(&Scope::All).len(), 4);
    }

    #[test]
    fn test_missing_scope_is_empty() {
        let store = Store::new(AppState::default());
        assert!(store.tasks_by_day("1403", "05", "01").is_empty());
        assert_eq!(store.summary_by_month("1403", "05"), Summary::default());
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::All.to_string(), "all");
        assert_eq!(Scope::month("1403", "05").to_string(), "1403/05");
        assert!(Scope::year("1403").contains("1403", "01", "01"));
        assert!(!Scope::day("1403", "01", "01").contains("1403", "01", "02"));
    }
}
