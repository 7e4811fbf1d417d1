//! HTTP transport: every command is a JSON POST to `{api_root}/{command}`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::client::{CommandRequest, CommandTransport, RequestKind};
use crate::{ClientError, ClientResult, CommandResponse};

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// reqwest-backed [`CommandTransport`].
#[derive(Clone)]
pub struct HttpTransport {
    http_client: Client,
    api_root: Url,
}

impl HttpTransport {
    /// Create a transport posting to `api_root` with a per-request timeout.
    pub fn new(api_root: Url, timeout: Duration) -> ClientResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_root,
        })
    }

    /// URL for a command name.
    pub fn command_url(&self, command: &str) -> ClientResult<Url> {
        let base = self.api_root.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, command))?)
    }
}

#[async_trait]
impl CommandTransport for HttpTransport {
    async fn send(&self, request: CommandRequest) -> ClientResult<CommandResponse> {
        let url = self.command_url(&request.command)?;
        let kind = match request.kind {
            RequestKind::Read => "read",
            RequestKind::Write => "write",
            RequestKind::SideEffect => "side-effect",
        };

        tracing::debug!(command = %request.command, kind, "sending command");

        let response = self
            .http_client
            .post(url)
            .header("Accept", "application/json")
            .json(&request.params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body_summary = summarize_response_body(&body);
            tracing::error!(
                command = %request.command,
                status = %status,
                body_summary = %body_summary,
                "command rejected"
            );
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body_summary,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
