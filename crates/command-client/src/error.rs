//! Command client error types.

use thiserror::Error;

/// Transport-level failures. Application failures arrive as a
/// [`crate::CommandResponse`] with a non-success `jsonCode` instead.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {body_summary}")]
    HttpStatus { status: u16, body_summary: String },

    /// Response body was not a command response
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Command URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-specific failure (test transports, closed connections)
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Returns true if the request may succeed when retried.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                e.status().is_some_and(|s| s.is_server_error())
            }
            ClientError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;
