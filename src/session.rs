//! Session Context
//!
//! Process-wide "who is signed in" state. The identity provider pushes
//! changes in; views subscribe and drop (or `unsubscribe`) when done.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::{UserId, UserIdentity};

/// Value carried by the session stream. `sign_ins` counts sign-ins so a
/// sign-out and sign-in of the same user that coalesce into one update
/// still read as a new sign-in.
#[derive(Debug, Clone, Default)]
struct SessionState {
    identity: Option<UserIdentity>,
    sign_ins: u64,
}

#[derive(Clone)]
pub struct SessionContext {
    tx: Arc<watch::Sender<SessionState>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Option<UserIdentity> {
        self.tx.borrow().identity.clone()
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.tx
            .borrow()
            .identity
            .as_ref()
            .map(|identity| identity.user_id.clone())
    }

    pub fn sign_in(&self, identity: UserIdentity) {
        log::info!("Session: signed in as {}", identity.user_id);
        self.tx.send_modify(|state| {
            let same_user = state
                .identity
                .as_ref()
                .is_some_and(|current| current.user_id == identity.user_id);
            if !same_user {
                state.sign_ins += 1;
            }
            state.identity = Some(identity);
        });
    }

    pub fn sign_out(&self) {
        let mut was_signed_in = false;
        self.tx.send_modify(|state| {
            was_signed_in = state.identity.take().is_some();
        });
        if was_signed_in {
            log::info!("Session: signed out");
        }
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.tx.subscribe(),
            seen: 0,
            primed: false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Receiver side of the session stream
pub struct SessionSubscription {
    rx: watch::Receiver<SessionState>,
    seen: u64,
    primed: bool,
}

impl SessionSubscription {
    /// Wait for the next sign-in: a change from no user (or a different
    /// user) to an identity. The state at subscribe time counts as a change,
    /// and so does signing out and back in as the same user, even when the
    /// two updates arrive together. Returns `None` once the context is gone.
    pub async fn next_sign_in(&mut self) -> Option<UserIdentity> {
        loop {
            if self.primed {
                self.rx.changed().await.ok()?;
            }
            self.primed = true;

            let state = self.rx.borrow_and_update().clone();
            let fresh = state.sign_ins != self.seen;
            self.seen = state.sign_ins;

            if fresh && state.identity.is_some() {
                return state.identity;
            }
        }
    }

    pub fn unsubscribe(self) {}
}
