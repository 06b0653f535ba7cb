use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use super::events::AccountEvent;

/// Errors that can occur when handling events; the dispatcher retries both
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Handler timed out")]
    Timeout,

    #[error("Handler failed: {0}")]
    Failed(String),
}

/// Trait for components that react to account events
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &AccountEvent) -> Result<(), EventError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// Writes every event to the log as an audit trail
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle(&self, event: &AccountEvent) -> Result<(), EventError> {
        match event {
            AccountEvent::AccountCreated {
                account_id,
                username,
            } => {
                info!(
                    event_type = event.event_type(),
                    account_id,
                    username = %username,
                    "Account created"
                );
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LoggingEventHandler"
    }
}
