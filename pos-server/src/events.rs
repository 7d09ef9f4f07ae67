//! Post-commit event fan-out
//!
//! Managers publish a [`PosEvent`] only after their write transaction has
//! committed, so a subscriber never sees a change that was rolled back.

use shared::models::PosEvent;
use tokio::sync::broadcast;

pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PosEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PosEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: PosEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event dropped: no active receivers");
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = PosEvent>) {
        for event in events {
            self.publish(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
