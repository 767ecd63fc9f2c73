//! Broker adapters.
//!
//! - `InMemoryBroker` - In-process fan-out for tests and single-process demos
//! - `RedisBroker` - Redis pub/sub for multi-node deployments

mod in_memory;
mod redis;

pub use self::in_memory::InMemoryBroker;
pub use self::redis::RedisBroker;
