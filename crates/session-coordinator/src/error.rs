//! Session coordinator error types.

use command_client::ClientError;
use thiserror::Error;

/// Errors raised inside coordinator flows.
///
/// Public operations log these instead of returning them; callers observe
/// outcomes through the store.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Command transport failed
    #[error("Command error: {0}")]
    Client(#[from] ClientError),

    /// Backend refused a re-authentication
    #[error("Reauthentication failed ({json_code}): {message}")]
    Reauthentication { json_code: i64, message: String },

    /// Device identity could not be resolved
    #[error("Device identity error: {0}")]
    DeviceIdentity(String),

    /// Invalid state transition in the auto-auth FSM
    #[error("Invalid auto-auth state transition: {0}")]
    InvalidStateTransition(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using SessionError.
pub type SessionResult<T> = Result<T, SessionError>;
