use tokio::sync::broadcast;
use tracing::debug;

use super::events::AccountEvent;

/// Event bus for distributing account events throughout the application
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AccountEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` undelivered events
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Publishes an event to all current subscribers
    pub fn publish(&self, event: AccountEvent) {
        let event_type = event.event_type();
        let account_id = event.account_id();
        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    event_type,
                    account_id,
                    receivers = receiver_count,
                    "Event published"
                );
            }
            Err(_) => {
                debug!(event_type, account_id, "Event published with no receivers");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AccountEvent> {
        self.sender.subscribe()
    }
}
