//! Logging initialization.
//!
//! Thin wrapper over the observability crate so every binary configures
//! the central JSONL stream the same way.

use observability::{LogConfig, ObservabilityMode};
use std::path::PathBuf;

/// Initialize the logging system for a session tool.
///
/// `TALLY_OBS_MODE=prod` switches to metadata-only entries.
/// `RUST_LOG` still wins over `level`.
pub fn init_logging(service_name: &str, level: &str, log_path: Option<PathBuf>) {
    let mode = match std::env::var("TALLY_OBS_MODE")
        .unwrap_or_else(|_| "dev".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "prod" | "production" => ObservabilityMode::ProdMetadataOnly,
        _ => ObservabilityMode::DevVerbose,
    };
    let environment = match mode {
        ObservabilityMode::ProdMetadataOnly => "production",
        ObservabilityMode::DevVerbose => "development",
    };

    observability::init_with_config(LogConfig {
        service_name: service_name.into(),
        default_level: parse_level(level).to_string().to_ascii_lowercase(),
        log_path,
        also_stderr: mode == ObservabilityMode::DevVerbose,
        mode,
        environment: environment.into(),
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
