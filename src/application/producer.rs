//! Producer - Wraps a payload in an envelope stamped with this node's
//! identity and publishes it.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::foundation::{BusError, EventEnvelope, EventId, Payload};
use crate::domain::node::{Destination, NodeIdentity};
use crate::ports::EventPublisher;

/// Event type of the application-level message the HTTP trigger sends.
pub const CUSTOM_EVENT: &str = "custom.event";

/// Producer façade over an `EventPublisher`.
#[derive(Clone)]
pub struct Producer {
    identity: Arc<NodeIdentity>,
    publisher: Arc<dyn EventPublisher>,
}

impl Producer {
    pub fn new(identity: Arc<NodeIdentity>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            identity,
            publisher,
        }
    }

    /// Send a `custom.event` carrying `payload`.
    ///
    /// `destination = None` broadcasts to every node.
    pub async fn send(
        &self,
        payload: impl Into<Payload>,
        destination: Option<Destination>,
    ) -> Result<EventId, BusError> {
        self.send_event(CUSTOM_EVENT, payload, destination).await
    }

    /// Send an envelope of any event type.
    pub async fn send_event(
        &self,
        event_type: &str,
        payload: impl Into<Payload>,
        destination: Option<Destination>,
    ) -> Result<EventId, BusError> {
        let envelope = self.envelope(event_type, payload, destination)?;
        self.publish(envelope).await
    }

    /// Build an envelope originating from this node.
    pub fn envelope(
        &self,
        event_type: &str,
        payload: impl Into<Payload>,
        destination: Option<Destination>,
    ) -> Result<EventEnvelope, BusError> {
        Ok(EventEnvelope::new(
            self.identity.id().clone(),
            destination,
            event_type,
            payload,
        )?)
    }

    /// Publish an already-built envelope.
    pub async fn publish(&self, envelope: EventEnvelope) -> Result<EventId, BusError> {
        if let Some(destination) = envelope.destination_service() {
            if !self.identity.is_reachable(destination) {
                // Peers may not have announced themselves yet
                warn!(
                    destination = %destination,
                    event_id = %envelope.event_id(),
                    "No known node matches destination, publishing anyway"
                );
            }
        }

        self.publisher.publish(&envelope).await?;

        info!(
            event_id = %envelope.event_id(),
            event_type = envelope.event_type(),
            destination = envelope.destination_service().map(ToString::to_string).unwrap_or_default(),
            "Sent event"
        );
        Ok(envelope.event_id().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TransportError;
    use crate::domain::node::NodeId;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        sent: Mutex<Vec<EventEnvelope>>,
        fail_with: Mutex<Option<TransportError>>,
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, envelope: &EventEnvelope) -> Result<(), TransportError> {
            if let Some(err) = self.fail_with.lock().unwrap().take() {
                return Err(err);
            }
            self.sent.lock().unwrap().push(envelope.clone());
            Ok(())
        }
    }

    fn producer() -> (Producer, Arc<RecordingPublisher>) {
        let identity = Arc::new(NodeIdentity::new(NodeId::parse("producer:1").unwrap()));
        let publisher = Arc::new(RecordingPublisher::default());
        (Producer::new(identity, publisher.clone()), publisher)
    }

    #[tokio::test]
    async fn send_stamps_origin_and_event_type() {
        let (producer, publisher) = producer();

        let id = producer.send("hello", None).await.unwrap();

        let sent = publisher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].event_id(), &id);
        assert_eq!(sent[0].origin_service().to_string(), "producer:1");
        assert_eq!(sent[0].event_type(), CUSTOM_EVENT);
        assert_eq!(sent[0].payload().as_text(), Some("hello"));
        assert!(sent[0].is_broadcast());
    }

    #[tokio::test]
    async fn unknown_destination_is_still_published() {
        let (producer, publisher) = producer();
        let destination = Destination::parse("consumer:2").unwrap();

        producer.send("hi", Some(destination.clone())).await.unwrap();

        let sent = publisher.sent.lock().unwrap();
        assert_eq!(sent[0].destination_service(), Some(&destination));
    }

    #[tokio::test]
    async fn each_send_gets_a_fresh_event_id() {
        let (producer, _) = producer();

        let first = producer.send("a", None).await.unwrap();
        let second = producer.send("a", None).await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn blank_event_type_is_rejected_before_publishing() {
        let (producer, publisher) = producer();

        let result = producer.send_event("  ", "x", None).await;

        assert!(matches!(result, Err(BusError::Validation(_))));
        assert!(publisher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_bus_error() {
        let (producer, publisher) = producer();
        *publisher.fail_with.lock().unwrap() = Some(TransportError::unavailable("down"));

        let err = producer.send("hello", None).await.unwrap_err();

        assert_eq!(err.code(), "TRANSPORT_UNAVAILABLE");
    }
}
