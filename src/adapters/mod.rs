//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the bus to external systems:
//! - `broker` - Pub/sub brokers (in-memory, Redis)
//! - `events` - Envelope transport and dedup memory on top of a broker
//! - `http` - REST trigger and health endpoint

pub mod broker;
pub mod events;
pub mod http;

pub use broker::{InMemoryBroker, RedisBroker};
pub use events::{BusTransport, RecencyEventStore, RetryPolicy, SubscriptionHandle};
