//! Custom JSON layer for structured logging.
//!
//! Produces clean JSONL output with all required fields:
//! - timestamp (RFC 3339)
//! - level (DEBUG, INFO, WARN, ERROR)
//! - service and environment (from LogConfig)
//! - pid (process ID)
//! - target (module path)
//! - message
//! - fields (structured key-value pairs, redacted per mode)

use crate::ObservabilityMode;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

const REDACTED: &str = "[redacted]";

/// Field names whose values never reach the log file.
const DENYLIST_KEYS: [&str; 11] = [
    "token",
    "auth_token",
    "authtoken",
    "support_auth_token",
    "encrypted_auth_token",
    "password",
    "partner_password",
    "auto_generated_password",
    "validate_code",
    "two_factor_auth_code",
    "id_token",
];

/// Fields kept in production mode.
const PROD_ALLOWED_FIELDS: [&str; 8] = [
    "command",
    "json_code",
    "channel_name",
    "form",
    "auto_auth_state",
    "key",
    "route",
    "elapsed_ms",
];

/// A single structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// RFC 3339 timestamp
    pub timestamp: String,
    /// Log level
    pub level: String,
    /// Service name
    pub service: String,
    /// Environment name
    pub environment: String,
    /// Process ID
    pub pid: u32,
    /// Target/subsystem (module path)
    pub target: String,
    /// Log message
    pub message: String,
    /// Structured fields
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, serde_json::Value>,
    /// Span context (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
}

/// Visitor that extracts fields from tracing events.
struct FieldVisitor {
    fields: HashMap<String, serde_json::Value>,
    message: Option<String>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            fields: HashMap::new(),
            message: None,
        }
    }

    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let value_str = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(value_str);
        } else {
            self.insert(field, serde_json::Value::String(value_str));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, serde_json::Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, serde_json::Value::Number(value.into()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, serde_json::Value::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, serde_json::Value::String(value.to_string()));
    }
}

/// Apply the mode's field policy in place.
fn apply_field_policy(mode: ObservabilityMode, fields: &mut HashMap<String, serde_json::Value>) {
    match mode {
        ObservabilityMode::DevVerbose => {
            for (key, value) in fields.iter_mut() {
                if DENYLIST_KEYS.contains(&key.to_ascii_lowercase().as_str()) {
                    *value = serde_json::Value::String(REDACTED.to_string());
                }
            }
        }
        ObservabilityMode::ProdMetadataOnly => {
            fields.retain(|key, _| PROD_ALLOWED_FIELDS.contains(&key.as_str()));
        }
    }
}

/// Custom JSON layer that produces clean JSONL output.
pub struct JsonLayer<W> {
    service_name: String,
    environment: String,
    mode: ObservabilityMode,
    pid: u32,
    make_writer: W,
}

impl<W> JsonLayer<W> {
    pub fn new(
        service_name: String,
        environment: String,
        mode: ObservabilityMode,
        make_writer: W,
    ) -> Self {
        Self {
            service_name,
            environment,
            mode,
            pid: std::process::id(),
            make_writer,
        }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);
        apply_field_policy(self.mode, &mut visitor.fields);

        let span_name = ctx.event_span(event).map(|s| s.name().to_string());
        let metadata = event.metadata();

        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            level: level_to_string(*metadata.level()),
            service: self.service_name.clone(),
            environment: self.environment.clone(),
            pid: self.pid,
            target: metadata.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
            span: span_name,
        };

        if let Ok(json) = serde_json::to_string(&entry) {
            let mut writer = self.make_writer.make_writer();
            let _ = writeln!(writer, "{}", json);
        }
    }
}

fn level_to_string(level: Level) -> String {
    match level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARN",
        Level::ERROR => "ERROR",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_entry_serialization() {
        let entry = LogEntry {
            timestamp: "2024-01-15T10:30:00.000000Z".to_string(),
            level: "INFO".to_string(),
            service: "tally-session".to_string(),
            environment: "development".to_string(),
            pid: 12345,
            target: "session_coordinator::coordinator".to_string(),
            message: "sign in started".to_string(),
            fields: HashMap::new(),
            span: None,
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"service\":\"tally-session\""));
        assert!(json.contains("\"pid\":12345"));
        assert!(!json.contains("\"fields\""));
    }

    #[test]
    fn test_dev_mode_redacts_secret_fields() {
        let mut fields = HashMap::new();
        fields.insert("auth_token".to_string(), json!("abc"));
        fields.insert("validate_code".to_string(), json!("123456"));
        fields.insert("command".to_string(), json!("SigninUser"));

        apply_field_policy(ObservabilityMode::DevVerbose, &mut fields);

        assert_eq!(fields["auth_token"], json!(REDACTED));
        assert_eq!(fields["validate_code"], json!(REDACTED));
        assert_eq!(fields["command"], json!("SigninUser"));
    }

    #[test]
    fn test_prod_mode_keeps_allowed_fields_only() {
        let mut fields = HashMap::new();
        fields.insert("email".to_string(), json!("user@example.com"));
        fields.insert("json_code".to_string(), json!(407));

        apply_field_policy(ObservabilityMode::ProdMetadataOnly, &mut fields);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields["json_code"], json!(407));
    }
}
