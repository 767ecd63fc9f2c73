//! Broker port - Interface to the external pub/sub system.
//!
//! The broker moves opaque bytes between nodes on a named topic. It knows
//! nothing about envelopes, retries or addressing; those live in the
//! `BusTransport` adapter wrapped around it.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::foundation::TransportError;

/// Messages received on one subscription.
///
/// The stream ending means the underlying connection was lost.
pub type BrokerStream = BoxStream<'static, Vec<u8>>;

/// Port for a publish/subscribe broker (Redis, in-memory, ...).
///
/// Implementations classify their failures: `TransportError::Transient` for
/// anything a retry may fix, `TransportError::Unavailable` otherwise.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Publish raw bytes to every current subscriber of `topic`.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Open a new subscription to `topic`.
    async fn subscribe(&self, topic: &str) -> Result<BrokerStream, TransportError>;

    /// Broker name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn Broker) {}
}
