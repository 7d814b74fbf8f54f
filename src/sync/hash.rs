//! Content hashing for change detection.
//!
//! Snapshots serialize canonically (ordered maps, fixed field order), so the
//! SHA256 of the serialized JSON is a deterministic fingerprint: equal hashes
//! mean byte-identical data.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::model::Snapshot;

/// Compute a SHA256 hash of a serializable value.
///
/// # Panics
///
/// Panics if the value cannot be serialized to JSON. This should never happen
/// for our data types which are all serializable.
#[must_use]
pub fn content_hash<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).expect("serialization should not fail");
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fingerprint of a snapshot's data.
#[must_use]
pub fn snapshot_hash(snapshot: &Snapshot) -> String {
    content_hash(snapshot)
}

/// Check if data has changed since it was last synced.
///
/// Returns `true` if there is no stored hash (never synced) or the hashes differ.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    #[test]
    fn test_snapshot_hash_deterministic() {
        let mut a = Snapshot::new();
        a.ensure_day("1403", "01", "02").tasks.push(Task::new("x").with_id("t1"));
        a.ensure_day("1402", "12", "29");

        // Same content built in a different order.
        let mut b = Snapshot::new();
        b.ensure_day("1402", "12", "29");
        b.ensure_day("1403", "01", "02").tasks.push(Task::new("x").with_id("t1"));

        assert_eq!(snapshot_hash(&a), snapshot_hash(&b));
        assert_eq!(snapshot_hash(&a).len(), 64);
    }

    #[test]
    fn test_snapshot_hash_changes_with_content() {
        let mut a = Snapshot::new();
        a.ensure_day("1403", "01", "02").tasks.push(Task::new("x").with_id("t1"));
        let mut b = a.clone();
        b.day_mut("1403", "01", "02").unwrap().tasks[0].is_done = true;

        assert_ne!(snapshot_hash(&a), snapshot_hash(&b));
    }

    #[test]
    fn test_has_changed() {
        assert!(has_changed("abc123", None));
        assert!(has_changed("abc123", Some("xyz789")));
        assert!(!has_changed("abc123", Some("abc123")));
    }
}
