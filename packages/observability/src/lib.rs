//! # Observability
//!
//! Centralized observability layer for the Tally workspace.
//!
//! ## Design Philosophy
//!
//! Crates are **log producers**, not log consumers. They call
//! `observability::init()` once at startup and use standard `tracing` macros
//! throughout their code. They have zero knowledge of where logs go or who
//! reads them.
//!
//! ## Dev Mode
//!
//! All processes write structured JSONL to a single central file:
//! `~/.tally/logs/dev.jsonl`
//!
//! - `tail -f ~/.tally/logs/dev.jsonl | jq` for pretty JSON
//! - `lnav ~/.tally/logs/dev.jsonl` for interactive exploration
//!
//! Credentials never reach the file: token, password and validate-code
//! fields are redacted before serialization, and in production mode only
//! an allow-list of metadata fields is kept.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "tally-session".into(),
//!         default_level: "debug".into(),
//!         also_stderr: true,
//!         ..Default::default()
//!     });
//!
//!     tracing::info!("ready");
//!     // before tearing a session down:
//!     let _ = observability::flush();
//! }
//! ```

#[cfg(feature = "dev")]
mod dev;

#[cfg(feature = "dev")]
mod json_layer;

use std::path::PathBuf;

/// Runtime export policy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservabilityMode {
    /// Development mode: include verbose payloads after secret redaction.
    #[default]
    DevVerbose,
    /// Production mode: keep metadata fields only.
    ProdMetadataOnly,
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "tally-session", "worker").
    /// Included in every log line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.tally/logs/dev.jsonl` in dev mode.
    pub log_path: Option<PathBuf>,

    /// Also emit logs to stderr for immediate feedback.
    pub also_stderr: bool,

    /// Runtime observability mode.
    pub mode: ObservabilityMode,

    /// Logical environment name written to every entry.
    pub environment: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
            mode: ObservabilityMode::DevVerbose,
            environment: "development".into(),
        }
    }
}

/// Initialize the observability layer with default settings.
///
/// # Panics
///
/// Panics if the log file cannot be created or opened.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize the observability layer with custom configuration.
pub fn init_with_config(config: LogConfig) {
    #[cfg(feature = "dev")]
    {
        dev::init_dev_subscriber(&config);
    }

    #[cfg(not(feature = "dev"))]
    {
        use tracing_subscriber::util::SubscriberInitExt;
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.default_level)),
            )
            .with_target(true)
            .compact()
            .finish()
            .init();
    }
}

/// Flush buffered log lines to the central file.
///
/// Safe to call before `init`; it is a no-op when no central writer exists.
pub fn flush() -> std::io::Result<()> {
    #[cfg(feature = "dev")]
    {
        dev::flush_central_writer()
    }

    #[cfg(not(feature = "dev"))]
    {
        Ok(())
    }
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
