//! The year → month → day hierarchy.
//!
//! Every node is held behind an [`Arc`]. Mutating accessors go through
//! [`Arc::make_mut`], so only the path to a touched day is copied while
//! untouched siblings stay shared with any reader holding an older snapshot.
//!
//! Keys are kept in [`BTreeMap`]s: serialization is canonical, so two equal
//! snapshots always produce identical bytes.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::amount;
use super::{Task, Transaction, TransactionKind, Versioned};

/// Leaf node: the records of one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayData {
    pub transactions: Vec<Transaction>,
    pub tasks: Vec<Task>,
}

impl DayData {
    /// Total number of records, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len() + self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.tasks.is_empty()
    }
}

/// Days of one month, keyed by day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthData(BTreeMap<String, Arc<DayData>>);

impl MonthData {
    #[must_use]
    pub fn day(&self, day: &str) -> Option<&DayData> {
        self.0.get(day).map(AsRef::as_ref)
    }

    pub fn days(&self) -> impl Iterator<Item = (&str, &DayData)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn day_mut(&mut self, day: &str) -> Option<&mut DayData> {
        self.0.get_mut(day).map(Arc::make_mut)
    }

    pub fn ensure_day(&mut self, day: &str) -> &mut DayData {
        Arc::make_mut(self.0.entry(day.to_string()).or_default())
    }

    pub fn insert(&mut self, day: impl Into<String>, data: DayData) {
        self.0.insert(day.into(), Arc::new(data));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Months of one year, keyed by month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearData(BTreeMap<String, Arc<MonthData>>);

impl YearData {
    #[must_use]
    pub fn month(&self, month: &str) -> Option<&MonthData> {
        self.0.get(month).map(AsRef::as_ref)
    }

    pub fn months(&self) -> impl Iterator<Item = (&str, &MonthData)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn month_mut(&mut self, month: &str) -> Option<&mut MonthData> {
        self.0.get_mut(month).map(Arc::make_mut)
    }

    pub fn ensure_month(&mut self, month: &str) -> &mut MonthData {
        Arc::make_mut(self.0.entry(month.to_string()).or_default())
    }

    pub fn insert(&mut self, month: impl Into<String>, data: MonthData) {
        self.0.insert(month.into(), Arc::new(data));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The complete dataset at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, Arc<YearData>>);

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn year(&self, year: &str) -> Option<&YearData> {
        self.0.get(year).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn month(&self, year: &str, month: &str) -> Option<&MonthData> {
        self.year(year).and_then(|y| y.month(month))
    }

    #[must_use]
    pub fn day(&self, year: &str, month: &str, day: &str) -> Option<&DayData> {
        self.month(year, month).and_then(|m| m.day(day))
    }

    pub fn years(&self) -> impl Iterator<Item = (&str, &YearData)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Flatten the hierarchy into `(year, month, day, data)` tuples.
    pub fn days(&self) -> impl Iterator<Item = (&str, &str, &str, &DayData)> {
        self.years().flat_map(|(y, year)| {
            year.months()
                .flat_map(move |(m, month)| month.days().map(move |(d, day)| (y, m, d, day)))
        })
    }

    /// Mutable access to an existing day.
    ///
    /// Returns `None` without copying anything when the day does not exist.
    pub fn day_mut(&mut self, year: &str, month: &str, day: &str) -> Option<&mut DayData> {
        self.day(year, month, day)?;
        self.0
            .get_mut(year)
            .map(Arc::make_mut)
            .and_then(|y| y.month_mut(month))
            .and_then(|m| m.day_mut(day))
    }

    pub fn ensure_year(&mut self, year: &str) -> &mut YearData {
        Arc::make_mut(self.0.entry(year.to_string()).or_default())
    }

    pub fn ensure_month(&mut self, year: &str, month: &str) -> &mut MonthData {
        self.ensure_year(year).ensure_month(month)
    }

    pub fn ensure_day(&mut self, year: &str, month: &str, day: &str) -> &mut DayData {
        self.ensure_month(year, month).ensure_day(day)
    }

    pub fn insert(&mut self, year: impl Into<String>, data: YearData) {
        self.0.insert(year.into(), Arc::new(data));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of records in the snapshot, tombstones included.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.days().map(|(_, _, _, day)| day.len()).sum()
    }

    /// Number of tombstoned records.
    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.days()
            .map(|(_, _, _, day)| {
                day.transactions.iter().filter(|t| t.is_deleted()).count()
                    + day.tasks.iter().filter(|t| t.is_deleted()).count()
            })
            .sum()
    }

    /// Whether any record, live or tombstoned, already uses `id`.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.days().any(|(_, _, _, day)| {
            day.transactions.iter().any(|t| t.id == id) || day.tasks.iter().any(|t| t.id == id)
        })
    }

    /// Records present in `self` but absent from, or different in, `base`.
    #[must_use]
    pub fn changes_since(&self, base: &Snapshot) -> Snapshot {
        let mut changes = Snapshot::new();
        for (y, m, d, day) in self.days() {
            let before = base.day(y, m, d);
            let transactions: Vec<_> = day
                .transactions
                .iter()
                .filter(|tx| before.is_none_or(|b| !b.transactions.contains(tx)))
                .cloned()
                .collect();
            let tasks: Vec<_> = day
                .tasks
                .iter()
                .filter(|task| before.is_none_or(|b| !b.tasks.contains(task)))
                .cloned()
                .collect();
            if !transactions.is_empty() || !tasks.is_empty() {
                let out = changes.ensure_day(y, m, d);
                out.transactions = transactions;
                out.tasks = tasks;
            }
        }
        changes
    }

    /// Largest stamp (update or deletion) found anywhere in the snapshot.
    #[must_use]
    pub fn max_stamp(&self) -> Option<i64> {
        fn stamp<T: Versioned>(item: &T) -> i64 {
            item.deleted_at().map_or(item.updated_at(), |d| d.max(item.updated_at()))
        }

        self.days()
            .flat_map(|(_, _, _, day)| {
                day.transactions
                    .iter()
                    .map(stamp)
                    .chain(day.tasks.iter().map(stamp))
            })
            .max()
    }
}

/// Income / expense totals over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(serialize_with = "amount::serialize")]
    pub income: Decimal,
    #[serde(serialize_with = "amount::serialize")]
    pub expense: Decimal,
    #[serde(serialize_with = "amount::serialize")]
    pub balance: Decimal,
}

impl Summary {
    /// Sum live transactions by kind. Tombstones are skipped.
    ///
    /// Totals saturate at the `Decimal` range instead of overflowing.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;

        for tx in transactions.into_iter().filter(|tx| !tx.is_deleted()) {
            match tx.kind {
                TransactionKind::Income => income = income.saturating_add(tx.amount),
                TransactionKind::Expense => expense = expense.saturating_add(tx.amount),
            }
        }

        Self {
            income,
            expense,
            balance: income.saturating_sub(expense),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, updated_at: i64) -> Transaction {
        Transaction {
            updated_at,
            ..Transaction::new(Decimal::ONE, TransactionKind::Income, "d").with_id(id)
        }
    }

    #[test]
    fn test_summary_saturates_instead_of_overflowing() {
        let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
        let income = |id: &str| Transaction {
            amount: huge,
            ..tx(id, 1)
        };
        let expense = Transaction {
            kind: TransactionKind::Expense,
            amount: -huge,
            ..tx("e", 1)
        };

        let summary = Summary::from_transactions(&[income("a"), income("b"), expense]);

        assert_eq!(summary.income, Decimal::MAX);
        assert_eq!(summary.expense, -huge);
        assert_eq!(summary.balance, Decimal::MAX);
    }

    #[test]
    fn test_changes_since_keeps_new_and_edited_records() {
        let mut base = Snapshot::new();
        base.ensure_day("1403", "05", "01").transactions.push(tx("same", 1));
        base.ensure_day("1403", "05", "01").transactions.push(tx("edited", 1));

        let mut current = base.clone();
        current.day_mut("1403", "05", "01").unwrap().transactions[1].updated_at = 2;
        current.ensure_day("1403", "06", "02").transactions.push(tx("new", 3));

        let changes = current.changes_since(&base);
        let ids: Vec<_> = changes.days().flat_map(|(_, _, _, d)| d.transactions.iter().map(|t| t.id.clone())).collect();
        assert_eq!(ids, vec!["edited".to_string(), "new".to_string()]);
        assert!(base.changes_since(&base).is_empty());
    }

    #[test]
    fn test_day_mut_missing_path_is_none() {
        let mut snapshot = Snapshot::new();
        snapshot.ensure_month("1403", "05");

        assert!(snapshot.day_mut("1403", "05", "01").is_none());
        assert!(snapshot.day_mut("1402", "05", "01").is_none());
        assert!(snapshot.day("1403", "05", "01").is_none());
    }

    #[test]
    fn test_copy_on_write_keeps_reader_view() {
        let mut snapshot = Snapshot::new();
        snapshot.ensure_day("1403", "05", "01").transactions.push(tx("a", 1));
        snapshot.ensure_day("1403", "06", "01").transactions.push(tx("b", 1));

        let reader = snapshot.clone();
        snapshot.day_mut("1403", "05", "01").unwrap().transactions.clear();

        assert_eq!(reader.day("1403", "05", "01").unwrap().transactions.len(), 1);
        assert!(snapshot.day("1403", "05", "01").unwrap().transactions.is_empty());

        // The untouched month is still the same allocation.
        let before = reader.year("1403").unwrap().0.get("06").unwrap();
        let after = snapshot.year("1403").unwrap().0.get("06").unwrap();
        assert!(Arc::ptr_eq(before, after));
    }

    #[test]
    fn test_serialization_is_nested_maps() {
        let mut snapshot = Snapshot::new();
        snapshot.ensure_day("1403", "05", "01").tasks.push(Task::new("x").with_id("t"));
        snapshot.ensure_year("1404");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["1403"]["05"]["01"]["tasks"][0]["id"], "t");
        assert_eq!(json["1403"]["05"]["01"]["transactions"], serde_json::json!([]));
        assert_eq!(json["1404"], serde_json::json!({}));
    }

    #[test]
    fn test_counts_and_max_stamp() {
        let mut snapshot = Snapshot::new();
        let day = snapshot.ensure_day("1403", "05", "01");
        day.transactions.push(tx("a", 10));
        let mut dead = tx("b", 20);
        dead.mark_deleted(40);
        day.transactions.push(dead);

        assert_eq!(snapshot.record_count(), 2);
        assert_eq!(snapshot.tombstone_count(), 1);
        assert_eq!(snapshot.max_stamp(), Some(40));
        assert_eq!(Snapshot::new().max_stamp(), None);
    }
}
