//! JSON merge semantics shared by `merge` writes and `Merge` updates.

use serde_json::{Map, Value};

/// Merge `change` into `existing`.
///
/// - `null` as the whole change removes the key (`None`).
/// - Objects merge recursively; `null` members delete that field.
/// - Any other value replaces the existing one.
pub fn merge_values(existing: Option<&Value>, change: &Value) -> Option<Value> {
    match (existing, change) {
        (_, Value::Null) => None,
        (Some(Value::Object(current)), Value::Object(patch)) => {
            Some(Value::Object(merge_objects(current, patch)))
        }
        (_, other) => Some(strip_nulls(other)),
    }
}

fn merge_objects(current: &Map<String, Value>, patch: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = current.clone();
    for (key, value) in patch {
        match value {
            Value::Null => {
                merged.remove(key);
            }
            Value::Object(_) => {
                match merge_values(current.get(key), value) {
                    Some(next) => merged.insert(key.clone(), next),
                    None => merged.remove(key),
                };
            }
            other => {
                merged.insert(key.clone(), other.clone());
            }
        }
    }
    merged
}

/// Drop `null` members from objects so stored documents never carry them.
fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
