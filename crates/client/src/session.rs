//! Process-wide session token.
//!
//! [`Session`] wraps a `tokio::sync::watch` channel so that every request
//! reads the latest token without locking, while the application can
//! rotate it (e.g. after re-authenticating) and observe rotations.

use std::sync::Arc;

use tokio::sync::watch;

/// Cheaply clonable handle to the current access token.
#[derive(Clone)]
pub struct Session {
    tx: Arc<watch::Sender<String>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Session {
    /// Start a session with `token`.
    pub fn new(token: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(token.into());
        Self { tx: Arc::new(tx) }
    }

    /// The token every outbound request must carry.
    pub fn token(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Install a new token, returning the previous one.
    ///
    /// Requests already being built may still observe the old value.
    pub fn replace(&self, token: impl Into<String>) -> String {
        self.tx.send_replace(token.into())
    }

    /// Watch for token rotations.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}
