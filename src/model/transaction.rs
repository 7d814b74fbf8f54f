//! Transaction model.
//!
//! A transaction is a single income or expense entry recorded on a day.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Versioned;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Get the string representation used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "in" => Ok(Self::Income),
            "expense" | "out" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {s}")),
        }
    }
}

/// An income or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier (UUID format)
    #[serde(default)]
    pub id: String,

    /// Amount in the user's currency unit
    #[serde(serialize_with = "amount::serialize")]
    pub amount: Decimal,

    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Calendar date string (opaque; grouping uses the container keys)
    #[serde(default)]
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    /// Last update timestamp (Unix milliseconds)
    #[serde(default)]
    pub updated_at: i64,

    /// Soft-delete timestamp (Unix milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

impl Transaction {
    /// Create a new transaction without an id or stamps.
    ///
    /// The store assigns both when the transaction is added.
    pub fn new(amount: Decimal, kind: TransactionKind, date: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            amount,
            kind,
            description: None,
            date: date.into(),
            labels: None,
            updated_at: 0,
            deleted_at: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Apply a partial update. Does not touch the stamps.
    pub fn apply(&mut self, patch: &TransactionPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(date) = &patch.date {
            self.date.clone_from(date);
        }
        if let Some(labels) = &patch.labels {
            self.labels = labels.clone();
        }
    }
}

impl Versioned for Transaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn deleted_at(&self) -> Option<i64> {
        self.deleted_at
    }

    fn mark_deleted(&mut self, stamp: i64) {
        self.deleted_at = Some(stamp);
        self.updated_at = stamp;
    }
}

/// Partial update for a transaction.
///
/// `None` leaves a field untouched. For optional fields, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub amount: Option<Decimal>,
    pub kind: Option<TransactionKind>,
    pub description: Option<Option<String>>,
    pub date: Option<String>,
    pub labels: Option<Option<Vec<String>>>,
}

impl TransactionPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.kind.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.labels.is_none()
    }
}

/// Amounts go on the wire as plain JSON numbers: integral values without a
/// fractional part so `500` stays `500` through a round-trip.
pub(crate) mod amount {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let normalized = amount.normalize();
        if normalized.scale() == 0 {
            if let Some(int) = normalized.to_i64() {
                return serializer.serialize_i64(int);
            }
        }
        match normalized.to_f64() {
            Some(float) => serializer.serialize_f64(float),
            None => serializer.serialize_str(&normalized.to_string()),
        }
    }
}
