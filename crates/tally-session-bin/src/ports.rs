//! Terminal-side implementations of the coordinator's ports.

use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use session_coordinator::{
    DeviceIdentityProvider, Navigator, RealtimeChannel, SessionError, SessionResult,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Device id persisted in a file, generated on first use.
pub struct LocalDeviceIdentity {
    path: PathBuf,
}

impl LocalDeviceIdentity {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn device_id(&self) -> SessionResult<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(existing) if !existing.trim().is_empty() => return Ok(existing.trim().to_string()),
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(SessionError::Io(err)),
        }

        let id = Uuid::new_v4().to_string();
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, &id).await?;
        info!("generated new device id");
        Ok(id)
    }
}

#[async_trait]
impl DeviceIdentityProvider for LocalDeviceIdentity {
    async fn device_info_with_id(&self) -> SessionResult<String> {
        let device_id = self.device_id().await?;
        let info = serde_json::json!({
            "deviceID": device_id,
            "platform": std::env::consts::OS,
            "appVersion": env!("CARGO_PKG_VERSION"),
        });
        Ok(info.to_string())
    }
}

/// Prints navigation requests instead of routing.
pub struct ConsoleNavigator {
    active_route: Mutex<Option<String>>,
    initial_url: Option<String>,
}

impl ConsoleNavigator {
    pub fn new(initial_url: Option<String>) -> Self {
        Self {
            active_route: Mutex::new(None),
            initial_url,
        }
    }
}

#[async_trait]
impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: &str) {
        println!("-> {route}");
        *self.active_route.lock() = Some(route.to_string());
    }

    fn is_active_route(&self, route: &str) -> bool {
        self.active_route.lock().as_deref() == Some(route)
    }

    async fn initial_url(&self) -> Option<String> {
        self.initial_url.clone()
    }
}

/// No live channel runs in a one-shot process; requests are only logged.
#[derive(Default)]
pub struct LoggedRealtime;

impl RealtimeChannel for LoggedRealtime {
    fn disconnect(&self) {
        debug!("realtime disconnect requested");
    }

    fn reconnect(&self) {
        debug!("realtime reconnect requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_device_id_is_generated_once() {
        let dir = TempDir::new().unwrap();
        let identity = LocalDeviceIdentity::new(dir.path().join("nested").join("device-id"));

        let first = identity.device_id().await.unwrap();
        let second = identity.device_id().await.unwrap();

        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[tokio::test]
    async fn test_device_info_carries_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device-id");
        std::fs::write(&path, "fixed-id\n").unwrap();

        let info = LocalDeviceIdentity::new(path)
            .device_info_with_id()
            .await
            .unwrap();
        let info: serde_json::Value = serde_json::from_str(&info).unwrap();

        assert_eq!(info["deviceID"], "fixed-id");
        assert_eq!(info["platform"], std::env::consts::OS);
    }

    #[tokio::test]
    async fn test_navigator_tracks_active_route() {
        let navigator = ConsoleNavigator::new(Some("https://new.tally.app/r/1".to_string()));
        assert!(!navigator.is_active_route("sign-in-modal"));

        navigator.navigate("sign-in-modal");

        assert!(navigator.is_active_route("sign-in-modal"));
        assert_eq!(
            navigator.initial_url().await.as_deref(),
            Some("https://new.tally.app/r/1")
        );
    }
}
