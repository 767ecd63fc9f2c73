//! EventPublisher port - Interface for publishing envelopes.
//!
//! This port defines how the producer side publishes envelopes without
//! knowing about the underlying broker (in-memory, Redis, etc.).

use async_trait::async_trait;

use crate::domain::foundation::{EventEnvelope, TransportError};

/// Port for publishing envelopes onto the bus.
///
/// Implementations must ensure:
/// - Envelopes are delivered at-least-once to connected subscribers
///   (handlers may receive duplicates)
/// - Transient failures are retried within a bounded window
/// - Permanent failures surface as `TransportError::Unavailable`
///
/// # Example
///
/// ```ignore
/// let envelope = EventEnvelope::new(origin, None, "custom.event", "hello")?;
/// publisher.publish(&envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single envelope.
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), TransportError>;

}
