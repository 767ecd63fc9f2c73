//! DispatchRegistry - Routes envelopes to local handlers by event type.
//!
//! Handlers run in registration order, one after another, each receiving the
//! same envelope. A failing (or panicking) handler is logged and skipped; the
//! handlers after it still run.

use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::domain::foundation::EventEnvelope;
use crate::ports::EventHandler;

/// Outcome of dispatching one envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that were invoked.
    pub invoked: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.invoked - self.failed
    }
}

/// Per-process table of `event_type -> handlers`.
///
/// Registration normally happens once at startup while dispatch runs
/// continuously, so the table sits behind a read-mostly lock. Dispatch
/// copies the handler list and releases the lock before awaiting handlers.
#[derive(Default)]
pub struct DispatchRegistry {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the handlers for `event_type`.
    pub fn register(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        debug!(event_type, handler = handler.name(), "Registering handler");
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }

    /// Register the same handler instance for several event types.
    pub fn register_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for event_type in event_types {
            handlers
                .entry(event_type.to_string())
                .or_default()
                .push(Arc::clone(&handler));
        }
    }

    /// Remove `handler` (by identity) from `event_type`. No-op if absent.
    ///
    /// Returns true if a registration was removed.
    pub fn deregister(&self, event_type: &str, handler: &Arc<dyn EventHandler>) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(list) = handlers.get_mut(event_type) else {
            return false;
        };

        let Some(position) = list.iter().position(|h| Arc::ptr_eq(h, handler)) else {
            return false;
        };
        list.remove(position);
        if list.is_empty() {
            handlers.remove(event_type);
        }
        true
    }

    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .map_or(0, Vec::len)
    }

    /// Invoke every handler registered for the envelope's type, in order.
    pub async fn dispatch(&self, envelope: &EventEnvelope) -> DispatchReport {
        // Clone handlers to release lock before await points
        let type_handlers: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(envelope.event_type())
            .cloned()
            .unwrap_or_default();

        let mut report = DispatchReport::default();
        for handler in type_handlers {
            report.invoked += 1;
            match AssertUnwindSafe(handler.handle(envelope)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(
                        event_id = %envelope.event_id(),
                        event_type = envelope.event_type(),
                        handler = handler.name(),
                        error = %e,
                        "Handler failed"
                    );
                }
                Err(_) => {
                    report.failed += 1;
                    warn!(
                        event_id = %envelope.event_id(),
                        event_type = envelope.event_type(),
                        handler = handler.name(),
                        "Handler panicked"
                    );
                }
            }
        }

        if report.invoked == 0 {
            debug!(event_type = envelope.event_type(), "No handlers registered");
        }
        report
    }
}
