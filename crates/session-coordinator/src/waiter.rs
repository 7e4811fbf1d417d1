//! Single-waiter slot for "resolve when the user signs in".

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::warn;

/// Holds at most one pending waiter.
///
/// Registering while a waiter is pending supersedes it: the older waiter is
/// logged and resolves `false`. Waiters never fail.
#[derive(Debug, Default)]
pub struct WaiterSlot {
    pending: Option<oneshot::Sender<bool>>,
}

impl WaiterSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new waiter, superseding any pending one.
    pub fn register(&mut self) -> SignInWait {
        let (sender, receiver) = oneshot::channel();
        if let Some(previous) = self.pending.replace(sender) {
            if !previous.is_closed() {
                warn!("sign-in waiter superseded by a newer waiter");
            }
            let _ = previous.send(false);
        }
        SignInWait::pending(receiver)
    }

    /// Resolve the pending waiter, if any. Returns true if one was resolved.
    pub fn resolve(&mut self, value: bool) -> bool {
        match self.pending.take() {
            Some(sender) => sender.send(value).is_ok(),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|sender| !sender.is_closed())
    }
}

/// Future returned by `wait_for_user_sign_in`.
#[derive(Debug)]
pub struct SignInWait {
    state: WaitState,
}

#[derive(Debug)]
enum WaitState {
    Ready(bool),
    Pending(oneshot::Receiver<bool>),
}

impl SignInWait {
    /// Already resolved.
    pub fn ready(value: bool) -> Self {
        Self {
            state: WaitState::Ready(value),
        }
    }

    fn pending(receiver: oneshot::Receiver<bool>) -> Self {
        Self {
            state: WaitState::Pending(receiver),
        }
    }

    /// True if this wait resolved at call time.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, WaitState::Ready(_))
    }
}

impl Future for SignInWait {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        match &mut self.state {
            WaitState::Ready(value) => Poll::Ready(*value),
            // A dropped sender (context torn down) resolves false.
            WaitState::Pending(receiver) => Pin::new(receiver).poll(cx).map(|r| r.unwrap_or(false)),
        }
    }
}
