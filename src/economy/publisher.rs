//! Event publisher
//!
//! Outbound notification channel for economy events. Observers subscribe
//! to a broadcast channel; they see operations only after they have been
//! persisted and cannot veto them.

use tokio::sync::broadcast;

use crate::domain::EconomyEvent;

#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<EconomyEvent>,
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EconomyEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish an event, returning how many subscribers received it.
    ///
    /// Having no subscribers is not an error.
    pub fn publish(&self, event: impl Into<EconomyEvent>) -> usize {
        let event = event.into();

        tracing::debug!(
            event_type = event.event_type(),
            account_id = %event.account_id(),
            result = ?event.result(),
            "Publishing economy event"
        );

        match self.sender.send(event) {
            Ok(delivered) => delivered,
            Err(_) => {
                tracing::trace!("No subscribers for economy event");
                0
            }
        }
    }
}
