//! Task model.
//!
//! Tasks are per-day to-do entries with an optional priority.

use serde::{Deserialize, Serialize};

use super::Versioned;

/// A to-do item recorded on a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier (UUID format)
    #[serde(default)]
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub is_done: bool,

    /// Ordinal priority; absent or non-positive means unprioritized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,

    /// Last update timestamp (Unix milliseconds)
    #[serde(default)]
    pub updated_at: i64,

    /// Soft-delete timestamp (Unix milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

impl Task {
    /// Create a new open task without an id or stamps.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: None,
            is_done: false,
            priority: None,
            updated_at: 0,
            deleted_at: None,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Whether the task carries a meaningful priority.
    #[must_use]
    pub fn is_prioritized(&self) -> bool {
        self.priority.is_some_and(|p| p > 0)
    }

    /// Apply a partial update. Does not touch the stamps.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(is_done) = patch.is_done {
            self.is_done = is_done;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }
}

impl Versioned for Task {
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

/// Partial update for a task.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub is_done: Option<bool>,
    pub priority: Option<Option<i64>>,
}

impl TaskPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.is_done.is_none()
            && self.priority.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_semantics() {
        assert!(!Task::new("a").is_prioritized());
        assert!(!Task::new("a").with_priority(0).is_prioritized());
        assert!(!Task::new("a").with_priority(-2).is_prioritized());
        assert!(Task::new("a").with_priority(3).is_prioritized());
    }

    #[test]
    fn test_wire_shape() {
        let task = Task::new("Pay rent").with_id("t1");
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["isDone"], false);
        assert_eq!(json["title"], "Pay rent");
        assert!(json.get("priority").is_none());
    }

    #[test]
    fn test_missing_is_done_defaults_false() {
        let task: Task = serde_json::from_str(r#"{"id":"t","title":"x","updatedAt":1}"#).unwrap();
        assert!(!task.is_done);
    }
}
