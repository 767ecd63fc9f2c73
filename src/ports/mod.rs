//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the bus core and the outside world. Adapters implement these ports.
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing envelopes
//! - `EventHandler` - Handler that processes dispatched envelopes
//! - `EnvelopeSink` - Receiver of raw messages from a subscription
//! - `ProcessedEventStore` - Recency tracking for deduplication
//!
//! ## Infrastructure Ports
//!
//! - `Broker` - External publish/subscribe transport

mod broker;
mod event_handler;
mod event_publisher;
mod processed_event_store;

pub use broker::{Broker, BrokerStream};
pub use event_handler::{EnvelopeSink, EventHandler};
pub use event_publisher::EventPublisher;
pub use processed_event_store::ProcessedEventStore;
