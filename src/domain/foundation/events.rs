//! Event envelope: the unit of data published and delivered on the bus.
//!
//! - `EventId` - Unique identifier for envelopes (deduplication)
//! - `Payload` - Type-tagged opaque event data
//! - `EventEnvelope` - Immutable transport wrapper with origin and destination
//!
//! Wire format is a camelCase JSON object; see [`EventEnvelope::encode`].

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::{DecodeError, Timestamp, ValidationError};
use crate::domain::node::{Destination, NodeId};

/// Unique identifier for envelopes (used for deduplication).
///
/// Unlike other IDs in the system, EventId uses a String internally
/// to allow for various ID formats (UUID, ULID, etc.) while maintaining
/// serializability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates an EventId from an existing string.
    ///
    /// No validation is performed.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event-specific data, tagged with its representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Text(String),
    Json(JsonValue),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn text(message: impl Into<String>) -> Self {
        Payload::Text(message.into())
    }

    /// Returns the message if this is a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Text(text) => write!(f, "{}", text),
            Payload::Json(value) => write!(f, "{}", value),
            Payload::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<JsonValue> for Payload {
    fn from(value: JsonValue) -> Self {
        Payload::Json(value)
    }
}

/// Transport envelope for bus events.
///
/// Immutable once built: fields are private and only readable through
/// accessors. `with_correlation_id` consumes the envelope, so it can only be
/// applied before the envelope is handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    event_id: EventId,
    origin_service: NodeId,
    destination_service: Option<Destination>,
    event_type: String,
    payload: Payload,
    timestamp: Timestamp,
    correlation_id: Option<String>,
}

impl EventEnvelope {
    /// Creates a new envelope with a fresh id and the current time.
    ///
    /// Fails if `event_type` is empty. `NodeId` cannot be empty by
    /// construction, so the origin is always present.
    pub fn new(
        origin: NodeId,
        destination: Option<Destination>,
        event_type: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Result<Self, ValidationError> {
        let event_type = event_type.into();
        if event_type.trim().is_empty() {
            return Err(ValidationError::empty_field("event_type"));
        }

        Ok(Self {
            event_id: EventId::new(),
            origin_service: origin,
            destination_service: destination,
            event_type,
            payload: payload.into(),
            timestamp: Timestamp::now(),
            correlation_id: None,
        })
    }

    /// Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn origin_service(&self) -> &NodeId {
        &self.origin_service
    }

    /// `None` means broadcast.
    pub fn destination_service(&self) -> Option<&Destination> {
        self.destination_service.as_ref()
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn is_broadcast(&self) -> bool {
        self.destination_service.is_none()
    }

    /// Deserialize a JSON payload to a specific type.
    ///
    /// Text payloads are offered to the deserializer as a JSON string.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        match &self.payload {
            Payload::Json(value) => serde_json::from_value(value.clone()),
            Payload::Text(text) => serde_json::from_value(JsonValue::String(text.clone())),
            Payload::Bytes(bytes) => serde_json::from_slice(bytes),
        }
    }

    /// Serializes to the wire format.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&WireEnvelope::from(self))
    }

    /// Parses the wire format, re-checking every envelope invariant.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let wire: WireEnvelope = serde_json::from_slice(bytes)?;
        Ok(Self::try_from(wire)?)
    }
}

#[cfg(test)]
impl EventEnvelope {
    /// Creates a test fixture EventEnvelope for use in tests.
    pub fn test_fixture() -> Self {
        Self::new(
            NodeId::parse("test-service:1").unwrap(),
            None,
            "test.event",
            Payload::text("test data"),
        )
        .unwrap()
    }
}

/// Serialized shape of an envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEnvelope {
    event_id: String,
    origin_service: String,
    #[serde(default)]
    destination_service: String,
    event_type: String,
    payload: Payload,
    timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl From<&EventEnvelope> for WireEnvelope {
    fn from(envelope: &EventEnvelope) -> Self {
        Self {
            event_id: envelope.event_id.to_string(),
            origin_service: envelope.origin_service.to_string(),
            destination_service: envelope
                .destination_service
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            event_type: envelope.event_type.clone(),
            payload: envelope.payload.clone(),
            timestamp: envelope.timestamp,
            correlation_id: envelope.correlation_id.clone(),
        }
    }
}

impl TryFrom<WireEnvelope> for EventEnvelope {
    type Error = ValidationError;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        if wire.event_id.is_empty() {
            return Err(ValidationError::empty_field("event_id"));
        }
        if wire.event_type.trim().is_empty() {
            return Err(ValidationError::empty_field("event_type"));
        }
        if wire.origin_service.is_empty() {
            return Err(ValidationError::empty_field("origin_service"));
        }

        let destination_service = if wire.destination_service.is_empty() {
            None
        } else {
            Some(Destination::parse(&wire.destination_service)?)
        };

        Ok(Self {
            event_id: EventId::from_string(wire.event_id),
            origin_service: NodeId::parse(&wire.origin_service)?,
            destination_service,
            event_type: wire.event_type,
            payload: wire.payload,
            timestamp: wire.timestamp,
            correlation_id: wire.correlation_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn origin() -> NodeId {
        NodeId::parse("producer:1").unwrap()
    }

    // ============================================================
    // EventId Tests
    // ============================================================

    #[test]
    fn event_id_generates_unique_values() {
        let id1 = EventId::new();
        let id2 = EventId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn event_id_is_a_uuid() {
        let id = EventId::new();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    // ============================================================
    // Construction Tests
    // ============================================================

    #[test]
    fn new_envelope_sets_fields() {
        let dest = Destination::parse("consumer").unwrap();
        let envelope =
            EventEnvelope::new(origin(), Some(dest.clone()), "custom.event", "hello").unwrap();

        assert_eq!(envelope.origin_service(), &origin());
        assert_eq!(envelope.destination_service(), Some(&dest));
        assert_eq!(envelope.event_type(), "custom.event");
        assert_eq!(envelope.payload().as_text(), Some("hello"));
        assert!(!envelope.is_broadcast());
        assert!(envelope.correlation_id().is_none());
    }

    #[test]
    fn new_envelope_rejects_empty_type() {
        let result = EventEnvelope::new(origin(), None, "  ", "hello");
        assert_eq!(result, Err(ValidationError::empty_field("event_type")));
    }

    #[test]
    fn envelopes_get_distinct_ids() {
        let a = EventEnvelope::new(origin(), None, "t", "x").unwrap();
        let b = EventEnvelope::new(origin(), None, "t", "x").unwrap();
        assert_ne!(a.event_id(), b.event_id());
    }

    #[test]
    fn payload_as_decodes_json() {
        #[derive(Deserialize, PartialEq, Debug)]
        struct Greeting {
            text: String,
        }

        let envelope =
            EventEnvelope::new(origin(), None, "greeting", json!({"text": "hi"})).unwrap();
        let greeting: Greeting = envelope.payload_as().unwrap();
        assert_eq!(greeting.text, "hi");
    }

    // ============================================================
    // Wire Format Tests
    // ============================================================

    #[test]
    fn wire_format_uses_camel_case_and_empty_broadcast_destination() {
        let envelope = EventEnvelope::new(origin(), None, "custom.event", "hello").unwrap();
        let value: JsonValue = serde_json::from_slice(&envelope.encode().unwrap()).unwrap();

        assert_eq!(value["eventId"], json!(envelope.event_id().as_str()));
        assert_eq!(value["originService"], json!("producer:1"));
        assert_eq!(value["destinationService"], json!(""));
        assert_eq!(value["eventType"], json!("custom.event"));
        assert_eq!(value["payload"], json!({"type": "text", "data": "hello"}));
        assert!(value["timestamp"].is_string());
        assert!(value.get("correlationId").is_none());
    }

    #[test]
    fn decode_accepts_missing_destination_as_broadcast() {
        let raw = json!({
            "eventId": "evt-1",
            "originService": "producer",
            "eventType": "custom.event",
            "payload": {"type": "text", "data": "hello"},
            "timestamp": "2024-01-01T00:00:00Z"
        });
        let envelope = EventEnvelope::decode(raw.to_string().as_bytes()).unwrap();
        assert!(envelope.is_broadcast());
        assert_eq!(envelope.event_id().as_str(), "evt-1");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            EventEnvelope::decode(b"not json"),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn decode_rejects_empty_origin() {
        let raw = json!({
            "eventId": "evt-1",
            "originService": "",
            "eventType": "custom.event",
            "payload": {"type": "text", "data": "hello"},
            "timestamp": "2024-01-01T00:00:00Z"
        });
        assert!(matches!(
            EventEnvelope::decode(raw.to_string().as_bytes()),
            Err(DecodeError::Invalid(ValidationError::EmptyField { .. }))
        ));
    }

    #[test]
    fn decode_rejects_bad_destination() {
        let raw = json!({
            "eventId": "evt-1",
            "originService": "producer",
            "destinationService": "a:b:c",
            "eventType": "custom.event",
            "payload": {"type": "text", "data": "hello"},
            "timestamp": "2024-01-01T00:00:00Z"
        });
        assert!(matches!(
            EventEnvelope::decode(raw.to_string().as_bytes()),
            Err(DecodeError::Invalid(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn correlation_id_survives_the_wire() {
        let envelope = EventEnvelope::new(origin(), None, "t", "x")
            .unwrap()
            .with_correlation_id("req-42");
        let decoded = EventEnvelope::decode(&envelope.encode().unwrap()).unwrap();
        assert_eq!(decoded.correlation_id(), Some("req-42"));
    }

    // ============================================================
    // Round-trip property
    // ============================================================

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_.-]{1,12}"
    }

    fn node_id() -> impl Strategy<Value = NodeId> {
        (segment(), proptest::option::of(segment()))
            .prop_map(|(service, instance)| NodeId::new(service, instance).unwrap())
    }

    fn destination() -> impl Strategy<Value = Option<Destination>> {
        proptest::option::of(node_id().prop_map(|id| Destination::parse(&id.to_string()).unwrap()))
    }

    fn payload() -> impl Strategy<Value = Payload> {
        prop_oneof![
            any::<String>().prop_map(Payload::Text),
            proptest::collection::vec(any::<u8>(), 0..64).prop_map(Payload::Bytes),
            (any::<i64>(), any::<String>(), any::<bool>())
                .prop_map(|(n, s, b)| Payload::Json(json!({"n": n, "s": s, "b": b}))),
        ]
    }

    proptest! {
        #[test]
        fn encode_then_decode_is_lossless(
            origin in node_id(),
            destination in destination(),
            event_type in "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}",
            payload in payload(),
            correlation in proptest::option::of("[a-z0-9-]{1,16}"),
        ) {
            let mut envelope = EventEnvelope::new(origin, destination, event_type, payload).unwrap();
            if let Some(correlation) = correlation {
                envelope = envelope.with_correlation_id(correlation);
            }

            let decoded = EventEnvelope::decode(&envelope.encode().unwrap()).unwrap();
            prop_assert_eq!(decoded, envelope);
        }
    }
}
