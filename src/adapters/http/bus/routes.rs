//! HTTP routes for bus endpoints.

use axum::{routing::get, Router};

use super::handlers::{health, send_message, BusHandlers};

/// Creates the bus router.
pub fn bus_routes(handlers: BusHandlers) -> Router {
    Router::new()
        .route("/send/:message", get(send_message))
        .route("/health", get(health))
        .with_state(handlers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::bus::{ErrorBody, HealthResponse, EVENT_ID_HEADER};
    use crate::adapters::{BusTransport, InMemoryBroker, RecencyEventStore, RetryPolicy};
    use crate::application::Node;
    use crate::domain::foundation::TransportError;
    use crate::domain::node::NodeId;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn node(broker: &Arc<InMemoryBroker>) -> Node {
        let transport = Arc::new(BusTransport::with_retry_policy(
            broker.clone(),
            "bus",
            RetryPolicy::immediate(),
        ));
        Node::new(
            NodeId::parse("producer:1").unwrap(),
            transport,
            Arc::new(RecencyEventStore::new(16)),
        )
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn send_publishes_and_confirms() {
        let broker = Arc::new(InMemoryBroker::new());
        let node = node(&broker);
        let app = bus_routes(BusHandlers::for_node(&node));

        let response = app.oneshot(get_request("/send/hello")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let event_id = response
            .headers()
            .get(EVENT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap();
        assert_eq!(body_string(response).await, "Sent event with message 'hello'.<br>");

        let published = broker.published_envelopes();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].event_id().as_str(), event_id);
        assert_eq!(published[0].payload().as_text(), Some("hello"));
        assert!(published[0].is_broadcast());
    }

    #[tokio::test]
    async fn broker_outage_is_service_unavailable() {
        let broker = Arc::new(InMemoryBroker::new());
        broker.fail_next_publishes(TransportError::unavailable("broker down"), 1);
        let node = node(&broker);
        let app = bus_routes(BusHandlers::for_node(&node));

        let response = app.oneshot(get_request("/send/hello")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorBody = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body.error.code, "TRANSPORT_UNAVAILABLE");
    }

    #[tokio::test]
    async fn health_reports_node_and_peers() {
        let broker = Arc::new(InMemoryBroker::new());
        let node = node(&broker);
        node.identity()
            .peers()
            .join(NodeId::parse("consumer:1").unwrap());
        let app = bus_routes(BusHandlers::for_node(&node));

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(health.node_id, "producer:1");
        assert_eq!(health.peers, vec!["consumer:1"]);
    }
}
