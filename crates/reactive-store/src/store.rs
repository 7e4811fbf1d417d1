//! The observable key-value store.
//!
//! # Design Principles
//!
//! - Listeners are notified after a write is committed
//! - Listeners never run while the store lock is held
//! - A write that leaves a key unchanged does not notify that key

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::merge::merge_values;
use crate::update::{StoreUpdate, UpdateMethod};
use crate::{StoreError, StoreResult};

/// Callback invoked with the latest value of a key (`None` when absent).
pub type Listener = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Handle returned by [`Store::connect`], used to disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    key: String,
    id: u64,
}

impl Connection {
    /// Key this connection observes.
    pub fn key(&self) -> &str {
        &self.key
    }
}

struct Inner {
    values: RwLock<HashMap<String, Value>>,
    listeners: Mutex<HashMap<String, Vec<(u64, Listener)>>>,
    next_id: AtomicU64,
}

/// Shared observable store. Cloning yields another handle to the same data.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

/// Pending notification: key plus its committed value.
type Change = (String, Option<Value>);

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_values(HashMap::new())
    }

    fn with_values(values: HashMap<String, Value>) -> Self {
        Self {
            inner: Arc::new(Inner {
                values: RwLock::new(values),
                listeners: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Builds a store from a snapshot object. `null` members are skipped.
    pub fn from_snapshot(snapshot: Map<String, Value>) -> Self {
        let values = snapshot
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect();
        Self::with_values(values)
    }

    /// Loads a store from a JSON snapshot file.
    ///
    /// A missing file yields an empty store so first runs need no setup.
    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no store snapshot, starting empty");
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(Self::from_snapshot(map)),
            other => Err(StoreError::InvalidSnapshot(format!(
                "expected an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Writes the current snapshot to `path`, creating parent directories.
    pub fn persist(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(self.snapshot()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Copies every key and value currently held.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.inner
            .values
            .read()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Returns the current value of `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.values.read().get(key).cloned()
    }

    /// Returns the current value of `key` decoded as `T`.
    ///
    /// Decode failures are logged and reported as `None`.
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        decode(key, self.get(key).as_ref())
    }

    /// Registers a listener for `key`.
    ///
    /// The listener fires immediately with the current value and then after
    /// every committed change to the key.
    pub fn connect<F>(&self, key: &str, listener: F) -> Connection
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(listener);

        self.inner
            .listeners
            .lock()
            .entry(key.to_string())
            .or_default()
            .push((id, listener.clone()));

        let current = self.get(key);
        listener(current.as_ref());

        Connection {
            key: key.to_string(),
            id,
        }
    }

    /// Registers a typed listener. Values that fail to decode arrive as `None`.
    pub fn connect_typed<T, F>(&self, key: &str, listener: F) -> Connection
    where
        T: DeserializeOwned,
        F: Fn(Option<T>) + Send + Sync + 'static,
    {
        let owned_key = key.to_string();
        self.connect(key, move |value| listener(decode(&owned_key, value)))
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn disconnect(&self, connection: &Connection) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let Some(entries) = listeners.get_mut(&connection.key) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(id, _)| *id != connection.id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            listeners.remove(&connection.key);
        }
        removed
    }

    /// Number of listeners registered for `key`.
    pub fn listener_count(&self, key: &str) -> usize {
        self.inner
            .listeners
            .lock()
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Deep-merges `value` into `key`. A `null` value removes the key.
    pub fn merge(&self, key: &str, value: Value) {
        self.update(&[StoreUpdate::merge(key, value)]);
    }

    /// Replaces `key` with `value`. A `null` value removes the key.
    pub fn set(&self, key: &str, value: Value) {
        self.update(&[StoreUpdate::set(key, value)]);
    }

    /// Sets several keys in one atomic write.
    pub fn multi_set<I, K>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let updates: Vec<StoreUpdate> = entries
            .into_iter()
            .map(|(key, value)| StoreUpdate::set(key, value))
            .collect();
        self.update(&updates);
    }

    /// Applies a patch list atomically, then notifies changed keys.
    ///
    /// Updates apply in order, so a later entry for the same key sees the
    /// result of an earlier one. Each changed key is notified once with its
    /// final value.
    pub fn update(&self, updates: &[StoreUpdate]) {
        if updates.is_empty() {
            return;
        }

        let changes = {
            let mut values = self.inner.values.write();
            let mut originals: Vec<(String, Option<Value>)> = Vec::new();

            for update in updates {
                if !originals.iter().any(|(key, _)| key == &update.key) {
                    originals.push((update.key.clone(), values.get(&update.key).cloned()));
                }

                let next = match update.method {
                    UpdateMethod::Set if update.value.is_null() => None,
                    UpdateMethod::Set => Some(update.value.clone()),
                    UpdateMethod::Merge => merge_values(values.get(&update.key), &update.value),
                };

                match next {
                    Some(value) => values.insert(update.key.clone(), value),
                    None => values.remove(&update.key),
                };
            }

            originals
                .into_iter()
                .filter_map(|(key, before)| {
                    let after = values.get(&key).cloned();
                    (after != before).then_some((key, after))
                })
                .collect::<Vec<Change>>()
        };

        self.notify(changes);
    }

    /// Removes every key except those in `preserve`.
    pub fn clear(&self, preserve: &[&str]) {
        let changes = {
            let mut values = self.inner.values.write();
            let removed: Vec<String> = values
                .keys()
                .filter(|key| !preserve.contains(&key.as_str()))
                .cloned()
                .collect();
            for key in &removed {
                values.remove(key);
            }
            removed
                .into_iter()
                .map(|key| (key, None))
                .collect::<Vec<Change>>()
        };

        debug!(cleared = changes.len(), preserved = preserve.len(), "store cleared");
        self.notify(changes);
    }

    fn notify(&self, changes: Vec<Change>) {
        for (key, value) in changes {
            // Clone the listener list so callbacks may connect or write.
            let listeners: Vec<Listener> = self
                .inner
                .listeners
                .lock()
                .get(&key)
                .map(|entries| entries.iter().map(|(_, l)| l.clone()).collect())
                .unwrap_or_default();

            for listener in listeners {
                listener(value.as_ref());
            }
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("keys", &self.inner.values.read().len())
            .finish()
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Option<&Value>) -> Option<T> {
    let value = value?;
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(key, error = %err, "stored value did not match expected shape");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
