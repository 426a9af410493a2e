//! In-process action bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ActionBus`] is the default [`ActionDispatcher`]. Share it via
//! `Arc<ActionBus>` between the pipeline and whatever renders state.

use tokio::sync::broadcast;

use crate::action::{Action, ActionDispatcher};

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out dispatcher.
///
/// # Usage
///
/// ```rust
/// use typefast_events::{ActionBus, ActionDispatcher, ActionKind};
///
/// let bus = ActionBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.started(ActionKind::PreviewSubmission);
/// assert!(rx.try_recv().is_ok());
/// ```
pub struct ActionBus {
    sender: broadcast::Sender<Action>,
}

impl ActionBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed actions are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to every action dispatched after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Action> {
        self.sender.subscribe()
    }
}

impl Default for ActionBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ActionDispatcher for ActionBus {
    fn dispatch(&self, action: Action) {
        tracing::debug!(action = ?action, "Dispatching action");
        // SendError only means there are zero receivers.
        let _ = self.sender.send(action);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
