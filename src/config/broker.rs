//! Broker selection

use serde::Deserialize;

/// Which broker backs the bus
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrokerKind {
    /// In-process broker; only nodes in the same process see each other
    #[default]
    Memory,
    /// Redis pub/sub
    Redis,
}

/// Broker configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BrokerConfig {
    #[serde(default)]
    pub kind: BrokerKind,
}
