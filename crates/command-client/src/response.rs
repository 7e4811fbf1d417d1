//! Command response envelope.

use reactive_store::StoreUpdate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `jsonCode` reported for a successful command.
pub const JSON_CODE_SUCCESS: i64 = 200;

/// `jsonCode` reported when the session is not authenticated.
pub const JSON_CODE_NOT_AUTHENTICATED: i64 = 407;

/// Response body returned by every command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    #[serde(default)]
    pub json_code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Store patches computed by the server, applied before success/failure data.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub onyx_data: Vec<StoreUpdate>,
    /// Command-specific fields (`authToken`, `auth`, `channel_data`, ...).
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl CommandResponse {
    /// Build a response with only a `jsonCode`.
    pub fn with_code(json_code: i64) -> Self {
        Self {
            json_code,
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.json_code == JSON_CODE_SUCCESS
    }

    pub fn is_not_authenticated(&self) -> bool {
        self.json_code == JSON_CODE_NOT_AUTHENTICATED
    }

    /// String field from the command payload.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// The command payload as a JSON object, without envelope fields.
    pub fn payload_value(&self) -> Value {
        Value::Object(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_success_with_payload() {
        let response: CommandResponse = serde_json::from_value(json!({
            "jsonCode": 200,
            "auth": "key:signature",
            "channel_data": "{}"
        }))
        .unwrap();

        assert!(response.is_success());
        assert_eq!(response.payload_str("auth"), Some("key:signature"));
        assert_eq!(
            response.payload_value(),
            json!({"auth": "key:signature", "channel_data": "{}"})
        );
    }

    #[test]
    fn test_parse_not_authenticated() {
        let response: CommandResponse =
            serde_json::from_value(json!({"jsonCode": 407, "message": "Auth failed"})).unwrap();

        assert!(response.is_not_authenticated());
        assert!(!response.is_success());
        assert_eq!(response.message.as_deref(), Some("Auth failed"));
    }

    #[test]
    fn test_parse_server_patches() {
        let response: CommandResponse = serde_json::from_value(json!({
            "jsonCode": 200,
            "onyxData": [{"onyxMethod": "merge", "key": "session", "value": {"email": "a@b.c"}}]
        }))
        .unwrap();

        assert_eq!(response.onyx_data.len(), 1);
        assert_eq!(response.onyx_data[0].key, "session");
        assert!(response.payload.is_empty());
    }
}
