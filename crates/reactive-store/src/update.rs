//! Patch-list entries applied around remote commands.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How an update is applied to its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMethod {
    /// Replace the value (`null` removes the key).
    Set,
    /// Deep-merge into the existing value.
    Merge,
}

/// One entry of an optimistic, success or failure patch list.
///
/// The wire shape matches the `onyxData` entries servers return, so
/// server-provided updates deserialize straight into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreUpdate {
    #[serde(rename = "onyxMethod")]
    pub method: UpdateMethod,
    pub key: String,
    pub value: Value,
}

impl StoreUpdate {
    /// Build a merge update.
    pub fn merge(key: impl Into<String>, value: Value) -> Self {
        Self {
            method: UpdateMethod::Merge,
            key: key.into(),
            value,
        }
    }

    /// Build a set update.
    pub fn set(key: impl Into<String>, value: Value) -> Self {
        Self {
            method: UpdateMethod::Set,
            key: key.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_patch_entries_deserialize() {
        let raw = json!([
            {"onyxMethod": "merge", "key": "session", "value": {"authToken": "abc"}},
            {"onyxMethod": "set", "key": "account", "value": null}
        ]);

        let updates: Vec<StoreUpdate> = serde_json::from_value(raw).unwrap();
        assert_eq!(updates[0], StoreUpdate::merge("session", json!({"authToken": "abc"})));
        assert_eq!(updates[1], StoreUpdate::set("account", Value::Null));
    }
}
