//! Behavior tests for the session coordinator.
//!
//! - `harness.rs`       - scripted transport, recording ports, TestHarness
//! - `sign_in.rs`       - begin/sign-in/magic-link flows and auto-auth state
//! - `account.rs`       - resend, unlink, short-lived token, account messages
//! - `sign_out.rs`      - fire-and-forget logout, cleanup, redirect
//! - `anonymous.rs`     - anonymous gating and route allow-list
//! - `pusher.rs`        - channel authorization and throttled reauthentication
//! - `waiter.rs`        - wait_for_user_sign_in
//! - `support_token.rs` - support impersonation and invalidation helpers
//! - `two_factor.rs`    - two-factor toggle and validation

mod anonymous;
pub(crate) mod harness;
mod two_factor;
