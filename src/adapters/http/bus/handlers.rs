//! HTTP handlers for bus endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::application::{Node, Producer};
use crate::domain::foundation::BusError;
use crate::domain::node::NodeIdentity;

use super::dto::{sent_confirmation, ErrorBody, ErrorResponse, HealthResponse};

/// Response header carrying the id of the published envelope.
pub const EVENT_ID_HEADER: &str = "x-event-id";

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct BusHandlers {
    producer: Producer,
    identity: Arc<NodeIdentity>,
}

impl BusHandlers {
    pub fn new(producer: Producer, identity: Arc<NodeIdentity>) -> Self {
        Self { producer, identity }
    }

    pub fn for_node(node: &Node) -> Self {
        Self::new(node.producer(), Arc::clone(node.identity()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /send/:message - Broadcast a custom event carrying `message`
pub async fn send_message(
    State(handlers): State<BusHandlers>,
    Path(message): Path<String>,
) -> Response {
    match handlers.producer.send(message.as_str(), None).await {
        Ok(event_id) => {
            let mut response = (StatusCode::OK, sent_confirmation(&message)).into_response();
            if let Ok(value) = HeaderValue::from_str(event_id.as_str()) {
                response.headers_mut().insert(EVENT_ID_HEADER, value);
            }
            response
        }
        Err(e) => handle_bus_error(e),
    }
}

/// GET /health - Node id and known peers
pub async fn health(State(handlers): State<BusHandlers>) -> Response {
    (
        StatusCode::OK,
        Json(HealthResponse::from(handlers.identity.as_ref())),
    )
        .into_response()
}

fn handle_bus_error(error: BusError) -> Response {
    let status = match &error {
        BusError::Validation(_) => StatusCode::BAD_REQUEST,
        BusError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    warn!(error = %error, code = error.code(), "Send failed");

    (
        status,
        Json(ErrorBody::from(ErrorResponse::new(error.code(), error.to_string()))),
    )
        .into_response()
}
