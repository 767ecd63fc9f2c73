//! Node identity and addressing.
//!
//! Resolves "this service instance" and decides whether a targeted envelope
//! is meant for it.

mod address;
mod identity;

pub use address::{is_addressed_to, Destination, NodeId};
pub use identity::{NodeIdentity, PeerDirectory};
