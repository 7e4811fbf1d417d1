//! File system paths for the session tooling.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Persisted store snapshot filename under the base directory.
const STORE_SNAPSHOT_NAME: &str = "store.json";
/// Device identifier filename under the base directory.
const DEVICE_ID_NAME: &str = "device-id";

/// Manages file system paths for the session tooling.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.tally)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.tally`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".tally"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.tally).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.tally/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the persisted store snapshot path (~/.tally/store.json).
    pub fn store_file(&self) -> PathBuf {
        self.base_dir.join(STORE_SNAPSHOT_NAME)
    }

    /// Get the device identifier path (~/.tally/device-id).
    pub fn device_id_file(&self) -> PathBuf {
        self.base_dir.join(DEVICE_ID_NAME)
    }

    /// Get the logs directory (~/.tally/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the central JSONL log path (~/.tally/logs/dev.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("dev.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
