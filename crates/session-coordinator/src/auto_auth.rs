//! Auto-auth state machine using rust-fsm.
//!
//! Tracks a passive (magic-link) sign-in across remounts of the UI that
//! started it.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │   NotStarted    │ (initial)
//! └────────┬────────┘
//!          │ SignInAttempt (from any state)
//!          ▼
//! ┌─────────────────┐
//! │   SigningIn     │
//! └────────┬────────┘
//!          │
//!          ├── SignInSucceeded ──► JustSignedIn
//!          │
//!          └── SignInFailed ─────► Failed
//! ```
//!
//! On startup the persisted state is normalised by [`init_auto_auth_state`]:
//! an interrupted or completed sign-in becomes `JustSignedIn`, anything else
//! becomes `NotStarted`.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

use crate::{SessionError, SessionResult};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub auto_auth_machine(NotStarted)

    NotStarted => {
        SignInAttempt => SigningIn
    },
    SigningIn => {
        SignInAttempt => SigningIn,
        SignInSucceeded => JustSignedIn,
        SignInFailed => Failed
    },
    JustSignedIn => {
        SignInAttempt => SigningIn
    },
    Failed => {
        SignInAttempt => SigningIn
    }
}

pub use auto_auth_machine::Input as AutoAuthMachineInput;
pub use auto_auth_machine::State as AutoAuthMachineState;
pub use auto_auth_machine::StateMachine as AutoAuthMachine;

/// Persisted auto-auth state, stored as `session.autoAuthState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoAuthState {
    #[default]
    NotStarted,
    SigningIn,
    JustSignedIn,
    Failed,
}

impl AutoAuthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoAuthState::NotStarted => "not-started",
            AutoAuthState::SigningIn => "signing-in",
            AutoAuthState::JustSignedIn => "just-signed-in",
            AutoAuthState::Failed => "failed",
        }
    }
}

impl From<&AutoAuthMachineState> for AutoAuthState {
    fn from(state: &AutoAuthMachineState) -> Self {
        match state {
            AutoAuthMachineState::NotStarted => AutoAuthState::NotStarted,
            AutoAuthMachineState::SigningIn => AutoAuthState::SigningIn,
            AutoAuthMachineState::JustSignedIn => AutoAuthState::JustSignedIn,
            AutoAuthMachineState::Failed => AutoAuthState::Failed,
        }
    }
}

impl From<AutoAuthState> for AutoAuthMachineState {
    fn from(state: AutoAuthState) -> Self {
        match state {
            AutoAuthState::NotStarted => AutoAuthMachineState::NotStarted,
            AutoAuthState::SigningIn => AutoAuthMachineState::SigningIn,
            AutoAuthState::JustSignedIn => AutoAuthMachineState::JustSignedIn,
            AutoAuthState::Failed => AutoAuthMachineState::Failed,
        }
    }
}

/// Apply one input to `current`.
pub fn advance_auto_auth(
    current: AutoAuthState,
    input: AutoAuthMachineInput,
) -> SessionResult<AutoAuthState> {
    let mut machine = AutoAuthMachine::from_state(current.into());
    machine.consume(&input).map_err(|_| {
        SessionError::InvalidStateTransition(format!(
            "Cannot apply {:?} in state {:?}",
            input, current
        ))
    })?;
    Ok(AutoAuthState::from(machine.state()))
}

/// Normalise a persisted state on startup.
pub fn init_auto_auth_state(cached: Option<AutoAuthState>) -> AutoAuthState {
    match cached {
        Some(AutoAuthState::SigningIn) | Some(AutoAuthState::JustSignedIn) => {
            AutoAuthState::JustSignedIn
        }
        _ => AutoAuthState::NotStarted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_not_started() {
        let machine = AutoAuthMachine::new();
        assert_eq!(*machine.state(), AutoAuthMachineState::NotStarted);
    }

    #[test]
    fn test_sign_in_success_flow() {
        let mut machine = AutoAuthMachine::new();

        machine.consume(&AutoAuthMachineInput::SignInAttempt).unwrap();
        assert_eq!(*machine.state(), AutoAuthMachineState::SigningIn);

        machine.consume(&AutoAuthMachineInput::SignInSucceeded).unwrap();
        assert_eq!(*machine.state(), AutoAuthMachineState::JustSignedIn);
    }

    #[test]
    fn test_sign_in_failure_flow() {
        let mut machine = AutoAuthMachine::new();

        machine.consume(&AutoAuthMachineInput::SignInAttempt).unwrap();
        machine.consume(&AutoAuthMachineInput::SignInFailed).unwrap();
        assert_eq!(*machine.state(), AutoAuthMachineState::Failed);
    }

    #[test]
    fn test_cannot_succeed_without_attempt() {
        let mut machine = AutoAuthMachine::new();
        assert!(machine
            .consume(&AutoAuthMachineInput::SignInSucceeded)
            .is_err());
        assert_eq!(*machine.state(), AutoAuthMachineState::NotStarted);
    }

    #[test]
    fn test_retry_after_failure() {
        let failed = advance_auto_auth(AutoAuthState::Failed, AutoAuthMachineInput::SignInAttempt)
            .unwrap();
        assert_eq!(failed, AutoAuthState::SigningIn);
    }

    #[test]
    fn test_advance_rejects_invalid_transition() {
        let result = advance_auto_auth(
            AutoAuthState::JustSignedIn,
            AutoAuthMachineInput::SignInFailed,
        );
        assert!(matches!(result, Err(SessionError::InvalidStateTransition(_))));
    }

    #[test]
    fn test_init_forces_just_signed_in_for_active_flows() {
        assert_eq!(
            init_auto_auth_state(Some(AutoAuthState::SigningIn)),
            AutoAuthState::JustSignedIn
        );
        assert_eq!(
            init_auto_auth_state(Some(AutoAuthState::JustSignedIn)),
            AutoAuthState::JustSignedIn
        );
    }

    #[test]
    fn test_init_resets_everything_else() {
        assert_eq!(
            init_auto_auth_state(Some(AutoAuthState::Failed)),
            AutoAuthState::NotStarted
        );
        assert_eq!(
            init_auto_auth_state(Some(AutoAuthState::NotStarted)),
            AutoAuthState::NotStarted
        );
        assert_eq!(init_auto_auth_state(None), AutoAuthState::NotStarted);
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&AutoAuthState::JustSignedIn).unwrap();
        assert_eq!(json, "\"just-signed-in\"");
        assert_eq!(AutoAuthState::JustSignedIn.as_str(), "just-signed-in");

        let parsed: AutoAuthState = serde_json::from_str("\"signing-in\"").unwrap();
        assert_eq!(parsed, AutoAuthState::SigningIn);
    }
}
