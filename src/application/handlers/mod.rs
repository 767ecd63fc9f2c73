//! Built-in event handlers.

mod custom_event_logger;
mod presence_tracker;

pub use custom_event_logger::CustomEventLogger;
pub use presence_tracker::{PresenceTracker, PRESENCE_JOINED, PRESENCE_LEFT};
