//! Envelope schema migrations.
//!
//! Migrations operate on the raw JSON of the envelope's `state` so they can
//! repair documents that would not deserialize into the current model. Each
//! step closes exactly one version gap and they run in order; there is no
//! downgrade path.

use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::model::CURRENT_VERSION;

/// A single migration step from `from` to `from + 1`.
struct Migration {
    from: u32,
    name: &'static str,
    apply: fn(&mut Value, i64) -> usize,
}

/// All migrations in order.
const MIGRATIONS: &[Migration] = &[Migration {
    from: 0,
    name: "backfill_record_stamps",
    apply: backfill_record_stamps,
}];

/// Bring `state` from `version` up to [`CURRENT_VERSION`].
///
/// `now` (Unix ms) is used wherever a step needs to invent a timestamp.
/// Returns the version the state ends up at.
pub fn migrate(state: &mut Value, version: u32, now: i64) -> u32 {
    let mut current = version;
    while current < CURRENT_VERSION {
        let Some(step) = MIGRATIONS.iter().find(|m| m.from == current) else {
            warn!(version = current, "No migration registered, stopping");
            break;
        };
        let touched = (step.apply)(state, now);
        current = step.from + 1;
        info!(migration = step.name, to = current, records = touched, "Applied migration");
    }
    current
}

/// Version 0 predates per-record stamps: fill in `id` and `updatedAt`, and
/// drop `deletedAt` values that are not timestamps.
///
/// Ids are UUID v5 values derived from the record's position and its
/// content. Migrating the same document twice yields the same ids, while two
/// devices that each kept a different record at the same position never
/// collide.
fn backfill_record_stamps(state: &mut Value, now: i64) -> usize {
    let mut touched = 0;
    let Some(years) = state.get_mut("data").and_then(Value::as_object_mut) else {
        return 0;
    };

    for (year, months) in years.iter_mut() {
        let Some(months) = months.as_object_mut() else { continue };
        for (month, days) in months.iter_mut() {
            let Some(days) = days.as_object_mut() else { continue };
            for (day, records) in days.iter_mut() {
                for kind in ["transactions", "tasks"] {
                    let Some(items) = records.get_mut(kind).and_then(Value::as_array_mut) else {
                        continue;
                    };
                    for (index, item) in items.iter_mut().enumerate() {
                        let Some(obj) = item.as_object_mut() else { continue };
                        let path = format!("{year}/{month}/{day}/{kind}/{index}");
                        if backfill_item(obj, &path, now) {
                            touched += 1;
                        }
                    }
                }
            }
        }
    }
    touched
}

fn backfill_item(obj: &mut Map<String, Value>, path: &str, now: i64) -> bool {
    let mut changed = false;

    let has_id = obj.get("id").and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    if !has_id {
        // Map keys are sorted, so this is canonical.
        let content = Value::Object(obj.clone()).to_string();
        let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("daybook:{path}:{content}").as_bytes());
        obj.insert("id".into(), Value::String(id.to_string()));
        changed = true;
    }

    let has_stamp = obj.get("updatedAt").and_then(Value::as_i64).is_some_and(|t| t > 0);
    if !has_stamp {
        obj.insert("updatedAt".into(), Value::from(now));
        changed = true;
    }

    if obj.get("deletedAt").is_some_and(|d| !d.is_null() && d.as_i64().is_none()) {
        obj.remove("deletedAt");
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v0_state() -> Value {
        json!({
            "data": {
                "1402": {
                    "11": {
                        "03": {
                            "transactions": [
                                {"amount": 500, "type": "income", "date": "1402/11/03"},
                                {"id": "keep", "amount": 20, "type": "expense", "date": "1402/11/03", "updatedAt": 77}
                            ],
                            "tasks": [
                                {"title": "old", "isDone": false, "deletedAt": "yesterday"}
                            ]
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_v0_backfills_ids_and_stamps() {
        let mut state = v0_state();
        let version = migrate(&mut state, 0, 1_000);

        assert_eq!(version, CURRENT_VERSION);
        let day = &state["data"]["1402"]["11"]["03"];
        let first = &day["transactions"][0];
        assert!(first["id"].as_str().is_some_and(|s| !s.is_empty()));
        assert_eq!(first["updatedAt"], 1_000);

        // Present fields are left alone.
        assert_eq!(day["transactions"][1]["id"], "keep");
        assert_eq!(day["transactions"][1]["updatedAt"], 77);

        assert!(day["tasks"][0].get("deletedAt").is_none());
        assert_eq!(day["tasks"][0]["updatedAt"], 1_000);
    }

    #[test]
    fn test_backfilled_ids_are_deterministic_and_distinct() {
        let mut a = v0_state();
        let mut b = v0_state();
        migrate(&mut a, 0, 1_000);
        migrate(&mut b, 0, 1_000);

        assert_eq!(a, b);
        let day = &a["data"]["1402"]["11"]["03"];
        assert_ne!(day["transactions"][0]["id"], day["tasks"][0]["id"]);
    }

    #[test]
    fn test_different_records_at_same_position_get_different_ids() {
        let record = |amount: i64, kind: &str| {
            json!({"data": {"1402": {"01": {"05": {
                "transactions": [{"amount": amount, "type": kind, "date": "1402/01/05"}]
            }}}}})
        };
        let mut coffee = record(4, "expense");
        let mut salary = record(900, "income");
        let mut coffee_again = record(4, "expense");
        migrate(&mut coffee, 0, 1_000);
        migrate(&mut salary, 0, 2_000);
        migrate(&mut coffee_again, 0, 3_000);

        let id = |state: &Value| state["data"]["1402"]["01"]["05"]["transactions"][0]["id"].clone();
        assert_ne!(id(&coffee), id(&salary));
        assert_eq!(id(&coffee), id(&coffee_again));
    }

    #[test]
    fn test_current_version_is_untouched() {
        let mut state = v0_state();
        let before = state.clone();

        assert_eq!(migrate(&mut state, CURRENT_VERSION, 1_000), CURRENT_VERSION);
        assert_eq!(state, before);
    }

    #[test]
    fn test_tolerates_odd_shapes() {
        let mut state = json!({"data": {"1402": [], "1403": {"01": {"02": {"tasks": "nope"}}}}});
        migrate(&mut state, 0, 1);
        assert_eq!(state["data"]["1402"], json!([]));
    }
}
