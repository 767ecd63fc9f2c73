//! EventHandler port - Interface for components that react to envelopes.
//!
//! Two seams live here:
//! - `EventHandler` - application code registered in the dispatch registry
//! - `EnvelopeSink` - what a transport subscription feeds raw messages into

use async_trait::async_trait;

use crate::domain::foundation::{EventEnvelope, HandlerError};

/// Handler for processing bus events.
///
/// Implementations should be:
/// - **Idempotent** - Duplicates are filtered upstream on a best-effort basis
/// - **Quick** - The listener processes one envelope at a time
/// - **Isolated** - Errors don't affect other handlers
///
/// # Example
///
/// ```ignore
/// struct AuditTrail { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for AuditTrail {
///     async fn handle(&self, event: &EventEnvelope) -> Result<(), HandlerError> {
///         let entry: AuditEntry = event.payload_as()?;
///         // Append to the audit trail...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "AuditTrail"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    ///
    /// Every handler registered for a type receives the same envelope.
    async fn handle(&self, event: &EventEnvelope) -> Result<(), HandlerError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Receiver of raw messages from a transport subscription.
///
/// Called once per received message, sequentially per subscription. Must
/// not fail: anything that goes wrong is handled (and logged) inside.
#[async_trait]
pub trait EnvelopeSink: Send + Sync {
    async fn receive(&self, raw: Vec<u8>);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that traits are object-safe
    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn EventHandler) {}

    #[allow(dead_code)]
    fn assert_sink_object_safe(_: &dyn EnvelopeSink) {}
}
