//! Command client: patch-list orchestration around a transport.

use std::sync::Arc;

use async_trait::async_trait;
use reactive_store::{Store, StoreUpdate};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::commands::{ReadCommand, SideEffectCommand, WriteCommand};
use crate::{ClientResult, CommandResponse};

/// Store key holding the session document.
const SESSION_KEY: &str = "session";

/// How the backend should treat a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Read,
    Write,
    SideEffect,
}

/// A command ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub command: String,
    pub kind: RequestKind,
    pub params: Map<String, Value>,
}

/// Sends commands to the backend.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn send(&self, request: CommandRequest) -> ClientResult<CommandResponse>;
}

/// Patch lists applied around a command.
///
/// `optimistic` is applied before the request is sent; `success` or
/// `failure` after it settles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreUpdates {
    pub optimistic: Vec<StoreUpdate>,
    pub success: Vec<StoreUpdate>,
    pub failure: Vec<StoreUpdate>,
}

impl StoreUpdates {
    pub fn new(
        optimistic: Vec<StoreUpdate>,
        success: Vec<StoreUpdate>,
        failure: Vec<StoreUpdate>,
    ) -> Self {
        Self {
            optimistic,
            success,
            failure,
        }
    }
}

/// Client issuing named commands and applying their patch lists.
pub struct CommandClient {
    transport: Arc<dyn CommandTransport>,
    store: Store,
}

impl CommandClient {
    pub fn new(transport: Arc<dyn CommandTransport>, store: Store) -> Self {
        Self {
            transport,
            store,
        }
    }

    /// Support token of the stored session, attached to every request while present.
    pub fn support_auth_token(&self) -> Option<String> {
        self.session_field("supportAuthToken")
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Send a read command with its patch lists.
    pub async fn read(
        &self,
        command: ReadCommand,
        params: Value,
        updates: StoreUpdates,
    ) -> ClientResult<CommandResponse> {
        self.send_with_updates(command.as_str(), RequestKind::Read, params, updates)
            .await
    }

    /// Send a write command with its patch lists.
    pub async fn write(
        &self,
        command: WriteCommand,
        params: Value,
        updates: StoreUpdates,
    ) -> ClientResult<CommandResponse> {
        self.send_with_updates(command.as_str(), RequestKind::Write, params, updates)
            .await
    }

    /// Send a command whose response carries an external-service payload.
    ///
    /// No patch lists run; the caller inspects `jsonCode` itself. Server
    /// patches in the response are still applied.
    pub async fn make_request_with_side_effects(
        &self,
        command: SideEffectCommand,
        params: Value,
    ) -> ClientResult<CommandResponse> {
        let request = self.build_request(command.as_str(), RequestKind::SideEffect, params);
        let response = self.transport.send(request).await?;
        self.store.update(&response.onyx_data);
        debug!(
            command = command.as_str(),
            json_code = response.json_code,
            "side-effect command settled"
        );
        Ok(response)
    }

    async fn send_with_updates(
        &self,
        command: &str,
        kind: RequestKind,
        params: Value,
        updates: StoreUpdates,
    ) -> ClientResult<CommandResponse> {
        self.store.update(&updates.optimistic);

        let request = self.build_request(command, kind, params);
        match self.transport.send(request).await {
            Ok(response) => {
                self.store.update(&response.onyx_data);
                if response.is_success() {
                    self.store.update(&updates.success);
                } else {
                    self.store.update(&updates.failure);
                }
                debug!(command, json_code = response.json_code, "command settled");
                Ok(response)
            }
            Err(err) => {
                warn!(command, error = %err, "command request failed");
                self.store.update(&updates.failure);
                Err(err)
            }
        }
    }

    fn build_request(&self, command: &str, kind: RequestKind, params: Value) -> CommandRequest {
        let mut params = match params {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                warn!(command, "command params must be an object, sending none");
                Map::new()
            }
        };

        // Callers that pass `authToken` (even null) opt out of the session token.
        if !params.contains_key("authToken") {
            if let Some(token) = self.session_auth_token() {
                params.insert("authToken".to_string(), Value::String(token));
            }
        }

        if let Some(support) = self.support_auth_token() {
            params.insert("supportAuthToken".to_string(), Value::String(support));
        }

        CommandRequest {
            command: command.to_string(),
            kind,
            params,
        }
    }

    fn session_auth_token(&self) -> Option<String> {
        self.session_field("authToken")
    }

    fn session_field(&self, field: &str) -> Option<String> {
        self.store
            .get(SESSION_KEY)?
            .get(field)?
            .as_str()
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }
}
