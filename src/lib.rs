//! Cloud Bus - Event propagation layer for service clusters
//!
//! Services broadcast typed events over a shared broker topic. Every node
//! decodes what it receives, keeps only envelopes addressed to it, drops
//! recent duplicates, and hands the rest to locally registered handlers.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
