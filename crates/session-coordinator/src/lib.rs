//! Session coordinator for the Tally client.
//!
//! This crate provides:
//! - Sign-in, sign-out and magic-link flows issued through the command client
//! - Explicit FSM-based auto-auth state management
//! - Anonymous-user gating and the anonymous route allow-list
//! - Real-time channel authorization with throttled re-authentication
//! - A session context holding the latest session and credentials

mod auto_auth;
mod context;
mod coordinator;
mod error;
mod keys;
mod ports;
mod realtime;
mod routes;
mod throttle;
mod timers;
mod timing;
mod two_factor;
mod types;
mod waiter;

#[cfg(test)]
mod tests;

pub use auto_auth::auto_auth_machine;
pub use auto_auth::{
    advance_auto_auth, init_auto_auth_state, AutoAuthMachine, AutoAuthMachineInput,
    AutoAuthMachineState, AutoAuthState,
};
pub use context::SessionContext;
pub use coordinator::{CoordinatorConfig, GatedAction, RedirectToSignIn, SessionCoordinator};
pub use error::{SessionError, SessionResult};
pub use keys::{forms, messages, store_keys};
pub use ports::{DeviceIdentityProvider, Navigator, ReadinessFlag, RealtimeChannel, SessionPorts};
pub use realtime::{ChannelAuthCallback, ChannelAuthError};
pub use routes::{
    can_access_route_by_anonymous_user, report_id_from_url, SIGN_IN_MODAL_ROUTE, SIGN_IN_ROUTE,
};
pub use throttle::{Throttle, ThrottleOutcome, TrailingPolicy};
pub use timers::Timers;
pub use timing::Timing;
pub use types::{
    Account, Credentials, Session, ANONYMOUS_AUTH_TOKEN_TYPE, INVALID_AUTH_TOKEN,
    INVALID_CREDENTIAL, SUPPORT_AUTH_TOKEN_TYPE,
};
pub use waiter::{SignInWait, WaiterSlot};
