//! HTTP adapter for the bus trigger.
//!
//! - `GET /send/:message` - Broadcast a custom event
//! - `GET /health` - Node id and known peers

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorBody, ErrorResponse, HealthResponse};
pub use handlers::{BusHandlers, EVENT_ID_HEADER};
pub use routes::bus_routes;
