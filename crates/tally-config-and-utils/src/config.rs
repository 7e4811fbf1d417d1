//! Configuration management for the session tooling.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default command API root (can be overridden at compile time via TALLY_API_ROOT env var).
pub const DEFAULT_API_ROOT: &str = match option_env!("TALLY_API_ROOT") {
    Some(url) => url,
    None => "https://www.tally.app/api",
};

/// Default web app URL used to recognise deep links (compile-time via TALLY_WEB_APP_URL).
pub const DEFAULT_WEB_APP_URL: &str = match option_env!("TALLY_WEB_APP_URL") {
    Some(url) => url,
    None => "https://new.tally.app",
};

/// Partner name sent with partner-authenticated commands (compile-time via TALLY_PARTNER_NAME).
pub const DEFAULT_PARTNER_NAME: &str = match option_env!("TALLY_PARTNER_NAME") {
    Some(name) => name,
    None => "tally-mobile",
};

/// Partner password sent with partner-authenticated commands (compile-time via TALLY_PARTNER_PASSWORD).
pub const DEFAULT_PARTNER_PASSWORD: &str = match option_env!("TALLY_PARTNER_PASSWORD") {
    Some(password) => password,
    None => "partner-password",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum spacing between real-time channel re-authentications.
pub const DEFAULT_PUSHER_REAUTH_WINDOW_MS: u64 = 5_000;

/// Main session tooling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Root URL that command names are appended to.
    #[serde(default = "default_api_root")]
    pub api_root: String,
    /// Web app origin; deep links under it are parsed for report ids.
    #[serde(default = "default_web_app_url")]
    pub web_app_url: String,
    /// Partner name for `LogOut` and `Authenticate`.
    #[serde(default = "default_partner_name")]
    pub partner_name: String,
    /// Partner password for `LogOut` and `Authenticate`.
    #[serde(default = "default_partner_password")]
    pub partner_password: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Real-time channel re-authentication throttle window.
    #[serde(default = "default_pusher_reauth_window_ms")]
    pub pusher_reauth_window_ms: u64,
}

fn default_api_root() -> String {
    DEFAULT_API_ROOT.to_string()
}

fn default_web_app_url() -> String {
    DEFAULT_WEB_APP_URL.to_string()
}

fn default_partner_name() -> String {
    DEFAULT_PARTNER_NAME.to_string()
}

fn default_partner_password() -> String {
    DEFAULT_PARTNER_PASSWORD.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_pusher_reauth_window_ms() -> u64 {
    DEFAULT_PUSHER_REAUTH_WINDOW_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_root: default_api_root(),
            web_app_url: default_web_app_url(),
            partner_name: default_partner_name(),
            partner_password: default_partner_password(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            pusher_reauth_window_ms: DEFAULT_PUSHER_REAUTH_WINDOW_MS,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from a file, falling back to defaults.
    /// Note: partner credentials are compile-time only and always use the
    /// built-in values, regardless of what's in the config file.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.partner_name = default_partner_name();
        config.partner_password = default_partner_password();

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    /// Only log_level can be overridden at runtime.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("TALLY_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    fn validate(&self) -> CoreResult<()> {
        self.api_root()?;
        self.web_app_url()?;
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the command API root as a parsed URL.
    pub fn api_root(&self) -> CoreResult<Url> {
        Url::parse(&self.api_root).map_err(CoreError::from)
    }

    /// Get the web app URL as a parsed URL.
    pub fn web_app_url(&self) -> CoreResult<Url> {
        Url::parse(&self.web_app_url).map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.api_root, DEFAULT_API_ROOT);
        assert_eq!(config.pusher_reauth_window_ms, 5_000);
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        std::fs::write(
            &config_path,
            r#"{ "log_level": "debug", "request_timeout_secs": 5 }"#,
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.web_app_url, DEFAULT_WEB_APP_URL);
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let mut config = Config::default();
        config.log_level = "trace".to_string();
        config.pusher_reauth_window_ms = 2_500;
        config.partner_password = "from-file".to_string();

        config.save(&paths).unwrap();

        let loaded = Config::load(&paths).unwrap();
        assert_eq!(loaded.pusher_reauth_window_ms, 2_500);
        // Partner credentials are forced back to the compiled values.
        assert_eq!(loaded.partner_password, DEFAULT_PARTNER_PASSWORD);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.api_root, DEFAULT_API_ROOT);
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        let mut config = Config::default();
        config.request_timeout_secs = 0;
        config.save(&paths).unwrap();

        assert!(matches!(Config::load(&paths), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_config_invalid_url() {
        let mut config = Config::default();
        config.api_root = "not a valid url".to_string();

        assert!(config.api_root().is_err());
    }
}
