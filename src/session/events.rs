//! Session event bus.
//!
//! Collaborators that cannot call the guard directly raise signals here:
//! another process touching the token store, or an API call that hit an
//! unrecoverable authentication failure. The guard subscribes on
//! construction; the expiry/refresh core stays free of any concrete
//! notification mechanism.

use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Events are payload-free signals, so
/// lagging subscribers can safely skip ahead.
const EVENT_CAPACITY: usize = 16;

/// Signals that perturb the current session from outside the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Another writer changed the token store. The guard re-reads it and
    /// de-authenticates only if the access token is gone.
    StoreChanged,
    /// A collaborator's request pipeline failed authentication beyond
    /// recovery. The guard treats the session as invalid.
    ForceLogout,
}

/// Cloneable handle for raising and subscribing to session events.
#[derive(Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Signal that the token store was modified externally.
    pub fn store_changed(&self) {
        let _ = self.tx.send(SessionEvent::StoreChanged);
    }

    /// Signal that the current session must be treated as invalid.
    pub fn force_logout(&self) {
        let _ = self.tx.send(SessionEvent::ForceLogout);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
