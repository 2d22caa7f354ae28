//! Refresh signal fan-out to the host.

use rc_core::RefreshEvent;
use tokio::sync::broadcast;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Broadcasts `RefreshEvent`s. Publishing with no receivers is not an error.
#[derive(Debug, Clone)]
pub struct RefreshPublisher {
    event_tx: broadcast::Sender<RefreshEvent>,
}

impl Default for RefreshPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshPublisher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self { event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.event_tx.subscribe()
    }

    /// Returns the number of receivers the event reached.
    pub fn publish(&self, event: RefreshEvent) -> usize {
        self.event_tx.send(event).unwrap_or(0)
    }

    pub fn receiver_count(&self) -> usize {
        self.event_tx.receiver_count()
    }
}
