//! Core types, configuration, and utilities for the Tally session tooling.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_API_ROOT, DEFAULT_LOG_LEVEL, DEFAULT_PARTNER_NAME, DEFAULT_PARTNER_PASSWORD,
    DEFAULT_PUSHER_REAUTH_WINDOW_MS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WEB_APP_URL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
