//! Consumer - Receives raw envelopes from the transport and dispatches them.
//!
//! Every message walks the same path and always reaches a terminal outcome:
//!
//! ```text
//! Received ──decode──► Filtered ──dedup──► Deduplicated ──► Dispatched
//!    │                    │                     │
//!    ▼                    ▼                     ▼
//! Undecodable     NotAddressed / OwnEvent    Duplicate
//! ```
//!
//! There is no retry here; redelivery, if any, happens upstream.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::dispatch::{DispatchRegistry, DispatchReport};
use crate::domain::foundation::EventEnvelope;
use crate::domain::node::NodeIdentity;
use crate::ports::{EnvelopeSink, ProcessedEventStore};

/// Terminal state of one received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Bytes were not a valid envelope; dropped.
    Undecodable,
    /// Destination does not match this node; dropped silently.
    NotAddressed,
    /// Published by this very node while own events are ignored.
    OwnEvent,
    /// Already dispatched recently.
    Duplicate,
    /// Handed to the dispatch registry.
    Dispatched(DispatchReport),
}

/// Consumer façade in front of the dispatch registry.
pub struct Consumer {
    identity: Arc<NodeIdentity>,
    registry: Arc<DispatchRegistry>,
    processed: Arc<dyn ProcessedEventStore>,
    ignore_own_events: bool,
}

impl Consumer {
    pub fn new(
        identity: Arc<NodeIdentity>,
        registry: Arc<DispatchRegistry>,
        processed: Arc<dyn ProcessedEventStore>,
    ) -> Self {
        Self {
            identity,
            registry,
            processed,
            ignore_own_events: false,
        }
    }

    /// Drop envelopes that this node published itself.
    pub fn ignoring_own_events(mut self, ignore: bool) -> Self {
        self.ignore_own_events = ignore;
        self
    }

    /// Run one raw message through decode, filter, dedup and dispatch.
    pub async fn process(&self, raw: &[u8]) -> DeliveryOutcome {
        let envelope = match EventEnvelope::decode(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, bytes = raw.len(), "Dropping undecodable envelope");
                return DeliveryOutcome::Undecodable;
            }
        };

        if !self.identity.accepts(envelope.destination_service()) {
            debug!(
                event_id = %envelope.event_id(),
                destination = ?envelope.destination_service().map(ToString::to_string),
                "Envelope not addressed to this node"
            );
            return DeliveryOutcome::NotAddressed;
        }

        if self.ignore_own_events && envelope.origin_service() == self.identity.id() {
            debug!(event_id = %envelope.event_id(), "Ignoring own envelope");
            return DeliveryOutcome::OwnEvent;
        }

        if !self.processed.insert_if_absent(envelope.event_id()).await {
            info!(event_id = %envelope.event_id(), "Skipping duplicate envelope");
            return DeliveryOutcome::Duplicate;
        }

        let report = self.registry.dispatch(&envelope).await;
        debug!(
            event_id = %envelope.event_id(),
            event_type = envelope.event_type(),
            origin = %envelope.origin_service(),
            invoked = report.invoked,
            failed = report.failed,
            "Envelope dispatched"
        );
        DeliveryOutcome::Dispatched(report)
    }
}

#[async_trait]
impl EnvelopeSink for Consumer {
    async fn receive(&self, raw: Vec<u8>) {
        self.process(&raw).await;
    }
}
