//! Domain layer containing the bus's value types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (event envelope, ids, timestamps, errors)
//! - `node` - Node ids, destination addressing and the peer directory

pub mod foundation;
pub mod node;
