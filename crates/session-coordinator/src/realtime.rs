//! Real-time channel authorization results.

use serde_json::Value;
use thiserror::Error;

/// Error handed to the channel library's authorizer callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelAuthError {
    /// Session token rejected; a re-authentication has been scheduled
    #[error("Not authenticated: channel authorization requires a fresh session")]
    NotAuthenticated,

    /// Backend refused the channel with another status
    #[error("Channel authorization rejected ({json_code}): {message}")]
    Rejected { json_code: i64, message: String },

    /// The authorization request itself failed
    #[error("Channel authorization request failed: {0}")]
    RequestFailed(String),
}

/// Authorizer callback: `(error, payload)`; payload is `{"auth": ""}` on error.
pub type ChannelAuthCallback = Box<dyn FnOnce(Option<ChannelAuthError>, Value) + Send>;

/// Payload passed alongside an error.
pub(crate) fn empty_auth_payload() -> Value {
    serde_json::json!({ "auth": "" })
}
