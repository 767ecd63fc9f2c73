//! HTTP DTOs for bus endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::node::NodeIdentity;

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub peers: Vec<String>,
}

impl From<&NodeIdentity> for HealthResponse {
    fn from(identity: &NodeIdentity) -> Self {
        Self {
            status: "ok".to_string(),
            node_id: identity.id().to_string(),
            peers: identity
                .peers()
                .snapshot()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Error details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Top-level error body: `{"error": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorResponse,
}

impl From<ErrorResponse> for ErrorBody {
    fn from(error: ErrorResponse) -> Self {
        Self { error }
    }
}

/// Confirmation text returned by `GET /send/:message`.
pub fn sent_confirmation(message: &str) -> String {
    format!("Sent event with message '{}'.<br>", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::NodeId;

    #[test]
    fn confirmation_quotes_the_message() {
        assert_eq!(sent_confirmation("hello"), "Sent event with message 'hello'.<br>");
    }

    #[test]
    fn error_body_nests_under_error_key() {
        let body = ErrorBody::from(ErrorResponse::new("TRANSPORT_UNAVAILABLE", "down"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"]["code"], "TRANSPORT_UNAVAILABLE");
        assert_eq!(json["error"]["message"], "down");
    }

    #[test]
    fn health_lists_sorted_peers() {
        let identity = NodeIdentity::new(NodeId::parse("producer:1").unwrap());
        identity.peers().join(NodeId::parse("consumer:2").unwrap());
        identity.peers().join(NodeId::parse("consumer:1").unwrap());

        let health = HealthResponse::from(&identity);

        assert_eq!(health.node_id, "producer:1");
        assert_eq!(health.peers, vec!["consumer:1", "consumer:2"]);
    }
}
