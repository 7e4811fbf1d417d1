//! Test harness for coordinator behavior tests.
//!
//! Provides:
//! - ScriptedTransport: replays queued responses per command and records requests
//! - RecordingRealtime: counts disconnects and reconnects
//! - RecordingNavigator: records navigation with a configurable active route
//! - FixedDeviceIdentity: returns a fixed device description or fails
//! - TestHarness: wires them to a coordinator over a fresh store

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use command_client::{
    ClientError, ClientResult, CommandClient, CommandRequest, CommandResponse, CommandTransport,
};
use parking_lot::Mutex;
use reactive_store::{Store, StoreUpdate};
use serde_json::{Map, Value};

use crate::{
    CoordinatorConfig, DeviceIdentityProvider, Navigator, RealtimeChannel, SessionCoordinator,
    SessionError, SessionPorts, SessionResult,
};

pub const DEVICE_INFO: &str = "{\"deviceID\":\"device-123\"}";
pub const WEB_APP_URL: &str = "https://new.tally.app";

/// How the transport answers one request.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Scripted {
    /// Respond with this `jsonCode` and nothing else
    Code(i64),
    /// Respond with a full response
    Respond(CommandResponse),
    /// Fail at the transport level
    Fail(String),
    /// Never settle
    NeverRespond,
}

/// A request as the transport saw it, with the store contents at send time.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub request: CommandRequest,
    pub store_at_send: Map<String, Value>,
}

impl SentRequest {
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.request.params.get(key)
    }

    pub fn stored(&self, key: &str, field: &str) -> Option<&Value> {
        self.store_at_send.get(key)?.get(field)
    }
}

pub struct ScriptedTransport {
    store: Store,
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    sent: Mutex<Vec<SentRequest>>,
}

impl ScriptedTransport {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            scripts: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Queue an answer for the next `command`. Unscripted commands succeed.
    pub fn script(&self, command: &str, answer: Scripted) {
        self.scripts
            .lock()
            .entry(command.to_string())
            .or_default()
            .push_back(answer);
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().clone()
    }

    pub fn sent_for(&self, command: &str) -> Vec<SentRequest> {
        self.sent
            .lock()
            .iter()
            .filter(|sent| sent.request.command == command)
            .cloned()
            .collect()
    }

    pub fn count(&self, command: &str) -> usize {
        self.sent_for(command).len()
    }
}

#[async_trait]
impl CommandTransport for ScriptedTransport {
    async fn send(&self, request: CommandRequest) -> ClientResult<CommandResponse> {
        let answer = self
            .scripts
            .lock()
            .get_mut(&request.command)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Scripted::Code(command_client::JSON_CODE_SUCCESS));

        self.sent.lock().push(SentRequest {
            request,
            store_at_send: self.store.snapshot(),
        });

        match answer {
            Scripted::Code(code) => Ok(CommandResponse::with_code(code)),
            Scripted::Respond(response) => Ok(response),
            Scripted::Fail(reason) => Err(ClientError::Transport(reason)),
            Scripted::NeverRespond => std::future::pending().await,
        }
    }
}

#[derive(Default)]
pub struct RecordingRealtime {
    pub disconnects: AtomicUsize,
    pub reconnects: AtomicUsize,
}

impl RealtimeChannel for RecordingRealtime {
    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    fn reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
    }
}

impl RecordingRealtime {
    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn reconnect_count(&self) -> usize {
        self.reconnects.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    navigated: Mutex<Vec<String>>,
    active_route: Mutex<Option<String>>,
    initial_url: Mutex<Option<String>>,
}

impl RecordingNavigator {
    pub fn set_active_route(&self, route: &str) {
        *self.active_route.lock() = Some(route.to_string());
    }

    pub fn set_initial_url(&self, url: &str) {
        *self.initial_url.lock() = Some(url.to_string());
    }

    pub fn navigated(&self) -> Vec<String> {
        self.navigated.lock().clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.navigated.lock().push(route.to_string());
        *self.active_route.lock() = Some(route.to_string());
    }

    fn is_active_route(&self, route: &str) -> bool {
        self.active_route.lock().as_deref() == Some(route)
    }

    async fn initial_url(&self) -> Option<String> {
        self.initial_url.lock().clone()
    }
}

#[derive(Default)]
pub struct FixedDeviceIdentity {
    pub fail: AtomicBool,
}

#[async_trait]
impl DeviceIdentityProvider for FixedDeviceIdentity {
    async fn device_info_with_id(&self) -> SessionResult<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SessionError::DeviceIdentity("keychain locked".to_string()));
        }
        Ok(DEVICE_INFO.to_string())
    }
}

/// Coordinator wired to recording ports over a fresh store.
pub struct TestHarness {
    pub store: Store,
    pub transport: Arc<ScriptedTransport>,
    pub realtime: Arc<RecordingRealtime>,
    pub navigator: Arc<RecordingNavigator>,
    pub device: Arc<FixedDeviceIdentity>,
    pub coordinator: SessionCoordinator,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_store(Store::new())
    }

    /// Harness over a store seeded with `entries`.
    pub fn seeded(entries: Vec<(&str, Value)>) -> Self {
        let store = Store::new();
        store.multi_set(entries);
        Self::with_store(store)
    }

    fn with_store(store: Store) -> Self {
        let transport = Arc::new(ScriptedTransport::new(store.clone()));
        let realtime = Arc::new(RecordingRealtime::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let device = Arc::new(FixedDeviceIdentity::default());

        let client = Arc::new(CommandClient::new(transport.clone(), store.clone()));
        let ports = SessionPorts {
            realtime: realtime.clone(),
            device_identity: device.clone(),
            navigator: navigator.clone(),
        };
        let config = CoordinatorConfig {
            web_app_url: WEB_APP_URL.to_string(),
            ..CoordinatorConfig::default()
        };
        let coordinator = SessionCoordinator::new(store.clone(), client, ports, config);

        Self {
            store,
            transport,
            realtime,
            navigator,
            device,
            coordinator,
        }
    }

    /// Field of a stored document.
    pub fn stored(&self, key: &str, field: &str) -> Option<Value> {
        self.store.get(key)?.get(field).cloned()
    }
}

/// Response with `jsonCode` 200 and the given payload fields.
pub fn success_with(payload: Value) -> CommandResponse {
    let mut response = CommandResponse::with_code(command_client::JSON_CODE_SUCCESS);
    if let Value::Object(map) = payload {
        response.payload = map;
    }
    response
}

/// Response carrying server store patches.
pub fn success_with_updates(updates: Vec<StoreUpdate>) -> CommandResponse {
    let mut response = CommandResponse::with_code(command_client::JSON_CODE_SUCCESS);
    response.onyx_data = updates;
    response
}

/// Let spawned tasks run.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(1)).await;
}
