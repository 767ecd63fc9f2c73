//! HTTP adapters - REST trigger for the bus.

pub mod bus;

use axum::Router;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use bus::{bus_routes, BusHandlers};

/// Bus routes wrapped in request tracing and a per-request timeout.
pub fn create_app(handlers: BusHandlers, request_timeout: Duration) -> Router {
    bus_routes(handlers)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
