//! Snapshot delivery to the view layer
//!
//! The engine never hands out mutable access to its state. Views register
//! a [`Subscriber`] and receive a fresh snapshot after every transition.

use super::SyncMessage;

/// Receives state snapshots pushed by the engine
///
/// Implementations might re-render a view, forward the JSON from
/// [`SyncMessage::to_message`] over a bridge, or record snapshots in tests.
pub trait Subscriber {
    /// Delivers the latest state
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to deliver
    fn send_state(&self, state: &SyncMessage);
}

impl<F: Fn(&SyncMessage)> Subscriber for F {
    fn send_state(&self, state: &SyncMessage) {
        self(state);
    }
}
