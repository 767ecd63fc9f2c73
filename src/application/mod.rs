//! Application layer - Producer, consumer and dispatch.
//!
//! This layer turns the domain envelope and the transport port into the
//! two roles a node plays on the bus, and wires them together in `Node`.

mod consumer;
mod dispatch;
pub mod handlers;
mod node;
mod producer;

pub use consumer::{Consumer, DeliveryOutcome};
pub use dispatch::{DispatchRegistry, DispatchReport};
pub use node::Node;
pub use producer::{Producer, CUSTOM_EVENT};
