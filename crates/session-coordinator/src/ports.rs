//! Narrow interfaces to services owned outside this crate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::SessionResult;

/// Push-messaging connection used for live updates.
pub trait RealtimeChannel: Send + Sync {
    fn disconnect(&self);
    fn reconnect(&self);
}

/// Resolves the device description sent with sign-in commands.
#[async_trait]
pub trait DeviceIdentityProvider: Send + Sync {
    async fn device_info_with_id(&self) -> SessionResult<String>;
}

/// Route navigation and deep-link lookup.
#[async_trait]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
    fn is_active_route(&self, route: &str) -> bool;
    /// URL the app was opened with, if any.
    async fn initial_url(&self) -> Option<String>;
}

/// Shared boolean owned by another feature and reset on session cleanup.
#[derive(Debug, Clone, Default)]
pub struct ReadinessFlag {
    inner: Arc<AtomicBool>,
}

impl ReadinessFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.inner.store(false, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}

/// External services handed to the coordinator.
#[derive(Clone)]
pub struct SessionPorts {
    pub realtime: Arc<dyn RealtimeChannel>,
    pub device_identity: Arc<dyn DeviceIdentityProvider>,
    pub navigator: Arc<dyn Navigator>,
}
