//! Foundation module - Shared domain primitives.
//!
//! Contains the envelope, identifiers, timestamps and error types that form
//! the vocabulary of the bus.

mod errors;
mod events;
mod timestamp;

pub use errors::{BusError, DecodeError, HandlerError, TransportError, ValidationError};
pub use events::{EventEnvelope, EventId, Payload};
pub use timestamp::Timestamp;
