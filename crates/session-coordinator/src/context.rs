//! Latest session and credentials, mirrored from the store.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use reactive_store::{Connection, Store};
use tracing::debug;

use crate::keys::store_keys;
use crate::types::{Credentials, Session};
use crate::waiter::{SignInWait, WaiterSlot};

#[derive(Debug, Default)]
struct Mirrors {
    session: Session,
    credentials: Credentials,
    waiter: WaiterSlot,
}

/// Explicit holder for the values the coordinator reads synchronously.
///
/// Mirrors are updated by store listeners; the sign-in waiter is resolved
/// under the same lock so a token arriving between check and registration
/// cannot be missed.
#[derive(Debug)]
pub struct SessionContext {
    mirrors: Mutex<Mirrors>,
    connections: Mutex<Vec<Connection>>,
}

impl SessionContext {
    /// Create a context and connect it to `store`.
    pub fn attach(store: &Store) -> Arc<Self> {
        let context = Arc::new(Self {
            mirrors: Mutex::new(Mirrors::default()),
            connections: Mutex::new(Vec::new()),
        });

        let weak: Weak<Self> = Arc::downgrade(&context);
        let session = store.connect_typed::<Session, _>(store_keys::SESSION, move |session| {
            if let Some(context) = weak.upgrade() {
                context.observe_session(session.unwrap_or_default());
            }
        });

        let weak: Weak<Self> = Arc::downgrade(&context);
        let credentials =
            store.connect_typed::<Credentials, _>(store_keys::CREDENTIALS, move |credentials| {
                if let Some(context) = weak.upgrade() {
                    context.mirrors.lock().credentials = credentials.unwrap_or_default();
                }
            });

        context.connections.lock().extend([session, credentials]);
        context
    }

    /// Disconnect from `store`. Mirrors keep their last values.
    pub fn detach(&self, store: &Store) {
        for connection in self.connections.lock().drain(..) {
            store.disconnect(&connection);
        }
    }

    pub fn session(&self) -> Session {
        self.mirrors.lock().session.clone()
    }

    pub fn credentials(&self) -> Credentials {
        self.mirrors.lock().credentials.clone()
    }

    /// Resolves true now if a token is present, else when one is first observed.
    pub fn wait_for_sign_in(&self) -> SignInWait {
        let mut mirrors = self.mirrors.lock();
        if mirrors.session.has_auth_token() {
            return SignInWait::ready(true);
        }
        mirrors.waiter.register()
    }

    fn observe_session(&self, session: Session) {
        let mut mirrors = self.mirrors.lock();
        let signed_in = session.has_auth_token();
        mirrors.session = session;
        if signed_in && mirrors.waiter.resolve(true) {
            debug!("sign-in waiter released");
        }
    }
}
