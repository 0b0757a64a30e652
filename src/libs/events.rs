//! Store change events.
//!
//! The sync client owns an [`EventBus`] and emits a [`StoreEvent`] whenever
//! something outside the calling code path may care: remote data changed,
//! overdue tasks were rolled over, the store was wiped. Consumers subscribe
//! through [`EventBus::subscribe`]; there is no global notification name.

use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// High-level event kinds emitted by the sync client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Data in the remote store changed through this client.
    RemoteChanged,
    /// The rollover sweep moved overdue tasks to today.
    RolledOver { count: usize },
    /// The local store was wiped (debug builds only).
    Cleared,
}

/// Broadcast channel for [`StoreEvent`] values.
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Emits an event. Having no subscribers is not an error.
    pub fn emit(&self, event: StoreEvent) {
        if self.sender.send(event.clone()).is_err() {
            tracing::debug!(?event, "store event dropped, no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
