//! Remote command client.
//!
//! This crate provides:
//! - Named read, write and side-effect commands sent over a pluggable transport
//! - Optimistic, success and failure patch lists applied to a [`reactive_store::Store`]
//! - An HTTP transport posting JSON to `{api_root}/{command}`

mod client;
mod commands;
mod error;
mod http;
mod response;

pub use client::{CommandClient, CommandRequest, CommandTransport, RequestKind, StoreUpdates};
pub use commands::{ReadCommand, SideEffectCommand, WriteCommand};
pub use error::{ClientError, ClientResult};
pub use http::HttpTransport;
pub use response::{CommandResponse, JSON_CODE_NOT_AUTHENTICATED, JSON_CODE_SUCCESS};
