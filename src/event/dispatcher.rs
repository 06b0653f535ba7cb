use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::{
    bus::EventBus,
    events::AccountEvent,
    handler::{EventError, EventHandler},
};

/// Coordinates event distribution between the event bus and event handlers
///
/// Each event is handed to every handler; a failing handler is retried with
/// backoff up to `max_retries` times and never affects the others.
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
    event_bus: EventBus,
    handler_timeout: Duration,
    max_retries: u32,
}

impl EventDispatcher {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            handlers: Vec::new(),
            event_bus,
            handler_timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        info!(handler_name = handler.name(), "Registering event handler");
        self.handlers.push(handler);
    }

    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Spawns a background task dispatching events until the bus is dropped
    pub fn start_listening(self) -> JoinHandle<()> {
        let handlers = self.handlers;
        let mut receiver = self.event_bus.subscribe();
        let handler_timeout = self.handler_timeout;
        let max_retries = self.max_retries;

        info!(
            handler_count = handlers.len(),
            timeout_secs = handler_timeout.as_secs(),
            max_retries = max_retries,
            "Starting event dispatcher"
        );

        tokio::spawn(async move {
            loop {
                let event = match receiver.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Event dispatcher lagged behind, events dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                debug!(
                    event_type = event.event_type(),
                    account_id = event.account_id(),
                    "Dispatching event to {} handlers",
                    handlers.len()
                );

                let results = join_all(handlers.iter().map(|handler| {
                    Self::handle_with_retry(
                        Arc::clone(handler),
                        &event,
                        handler_timeout,
                        max_retries,
                    )
                }))
                .await;

                for result in results {
                    if let Err(e) = result {
                        error!(error = ?e, "Handler failed permanently");
                    }
                }
            }

            info!("Event dispatcher stopped listening");
        })
    }

    async fn handle_with_retry(
        handler: Arc<dyn EventHandler>,
        event: &AccountEvent,
        handler_timeout: Duration,
        max_retries: u32,
    ) -> Result<(), EventError> {
        let handler_name = handler.name();
        let event_type = event.event_type();

        for attempt in 0..=max_retries {
            match timeout(handler_timeout, handler.handle(event)).await {
                Ok(Ok(())) => {
                    if attempt > 0 {
                        info!(
                            handler = handler_name,
                            event_type = event_type,
                            attempt = attempt + 1,
                            "Handler succeeded after retry"
                        );
                    }
                    return Ok(());
                }
                Ok(Err(e)) if attempt < max_retries => {
                    warn!(
                        handler = handler_name,
                        event_type = event_type,
                        attempt = attempt + 1,
                        error = ?e,
                        "Handler failed, will retry"
                    );

                    // Exponential backoff
                    let delay = Duration::from_millis(100 * 2_u64.pow(attempt));
                    tokio::time::sleep(delay).await;
                }
                Ok(Err(e)) => {
                    error!(
                        handler = handler_name,
                        event_type = event_type,
                        attempt = attempt + 1,
                        error = ?e,
                        "Handler failed permanently"
                    );
                    return Err(e);
                }
                Err(_elapsed) if attempt < max_retries => {
                    warn!(
                        handler = handler_name,
                        event_type = event_type,
                        attempt = attempt + 1,
                        "Handler timed out, will retry"
                    );
                }
                Err(_elapsed) => {
                    error!(
                        handler = handler_name,
                        event_type = event_type,
                        "Handler timed out permanently"
                    );
                    return Err(EventError::Timeout);
                }
            }
        }

        Err(EventError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::sleep;

    struct CountingHandler {
        name: &'static str,
        call_count: AtomicU32,
    }

    impl CountingHandler {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                call_count: AtomicU32::new(0),
            })
        }

        fn call_count(&self) -> u32 {
            self.call_count.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _event: &AccountEvent) -> Result<(), EventError> {
            self.call_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    fn account_created(account_id: i64) -> AccountEvent {
        AccountEvent::AccountCreated {
            account_id,
            username: format!("user{}", account_id),
        }
    }

    #[tokio::test]
    async fn test_dispatcher_delivers_to_every_handler() {
        let event_bus = EventBus::with_default_capacity();
        let mut dispatcher = EventDispatcher::new(event_bus.clone());

        let handler1 = CountingHandler::new("handler1");
        let handler2 = CountingHandler::new("handler2");
        dispatcher.add_handler(handler1.clone());
        dispatcher.add_handler(handler2.clone());

        let _handle = dispatcher.start_listening();

        event_bus.publish(account_created(1));
        event_bus.publish(account_created(2));

        // Give handlers time to process
        sleep(Duration::from_millis(50)).await;

        assert_eq!(handler1.call_count(), 2);
        assert_eq!(handler2.call_count(), 2);
    }

    struct FailingHandler {
        fail_count: AtomicU32,
        max_failures: u32,
    }

    #[async_trait]
    impl EventHandler for FailingHandler {
        async fn handle(&self, _event: &AccountEvent) -> Result<(), EventError> {
            let current = self.fail_count.fetch_add(1, Ordering::Relaxed);
            if current < self.max_failures {
                Err(EventError::Failed("Simulated failure".to_string()))
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &'static str {
            "FailingHandler"
        }
    }

    #[tokio::test]
    async fn test_dispatcher_retry_logic() {
        let event_bus = EventBus::with_default_capacity();
        let mut dispatcher = EventDispatcher::new(event_bus.clone())
            .with_max_retries(3)
            .with_handler_timeout(Duration::from_millis(100));

        // Fails twice then succeeds
        let handler = Arc::new(FailingHandler {
            fail_count: AtomicU32::new(0),
            max_failures: 2,
        });
        dispatcher.add_handler(handler.clone());

        let _handle = dispatcher.start_listening();
        event_bus.publish(account_created(1));

        // Backoff is 100ms then 200ms
        sleep(Duration::from_millis(1000)).await;

        assert_eq!(handler.fail_count.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_dispatcher_gives_up_after_max_retries() {
        let event_bus = EventBus::with_default_capacity();
        let mut dispatcher = EventDispatcher::new(event_bus.clone())
            .with_max_retries(1)
            .with_handler_timeout(Duration::from_millis(100));

        let failing = Arc::new(FailingHandler {
            fail_count: AtomicU32::new(0),
            max_failures: u32::MAX,
        });
        let counting = CountingHandler::new("counting");
        dispatcher.add_handler(failing.clone());
        dispatcher.add_handler(counting.clone());

        let _handle = dispatcher.start_listening();
        event_bus.publish(account_created(1));

        // One retry after a 100ms backoff
        sleep(Duration::from_millis(500)).await;

        assert_eq!(failing.fail_count.load(Ordering::Relaxed), 2);
        assert_eq!(counting.call_count(), 1);
    }

    #[tokio::test]
    async fn test_dispatcher_stops_when_bus_dropped() {
        let event_bus = EventBus::new(10);
        let dispatcher = EventDispatcher::new(event_bus.clone());

        let handle = dispatcher.start_listening();
        drop(event_bus);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("dispatcher should stop")
            .unwrap();
    }
}
