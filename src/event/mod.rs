// Domain events for generated accounts
//
// The generator publishes onto the bus; the dispatcher fans events out to
// handlers in the background.

// Public API - what other modules can use
pub use bus::EventBus;
pub use dispatcher::EventDispatcher;
pub use events::AccountEvent;
pub use handler::{EventError, EventHandler, LoggingEventHandler};

// Internal modules
mod bus;
mod dispatcher;
mod events;
mod handler;
