//! Named duration measurements, cleared on sign-out.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Timing {
    started: Mutex<HashMap<String, Instant>>,
}

impl Timing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, name: &str) {
        self.started.lock().insert(name.to_string(), Instant::now());
    }

    /// Finish a measurement and log its duration.
    pub fn end(&self, name: &str) -> Option<Duration> {
        let started = self.started.lock().remove(name)?;
        let elapsed = started.elapsed();
        debug!(name, elapsed_ms = elapsed.as_millis() as u64, "timing measured");
        Some(elapsed)
    }

    pub fn clear(&self) {
        self.started.lock().clear();
    }

    pub fn in_progress(&self) -> usize {
        self.started.lock().len()
    }
}
