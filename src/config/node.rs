//! Node identity configuration

use serde::Deserialize;
use uuid::Uuid;

use super::error::ValidationError;
use crate::domain::foundation::ValidationError as AddressError;
use crate::domain::node::NodeId;

/// Who this process is on the bus
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// `service[:instance]`
    pub id: String,

    /// Broker topic shared by every node of the cluster
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Drop envelopes this node published itself
    #[serde(default)]
    pub ignore_own_events: bool,
}

impl NodeConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic: default_topic(),
            ignore_own_events: false,
        }
    }

    /// Parse the configured id, filling in a random 8-hex instance id when
    /// only a service name was given.
    ///
    /// Each call draws a fresh instance id, so resolve the id once at startup.
    pub fn node_id(&self) -> Result<NodeId, AddressError> {
        let id = NodeId::parse(self.id.trim())?;
        let generated = Uuid::new_v4().simple().to_string();
        id.with_default_instance(&generated[..8])
    }

    /// Validate node configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("NODE__ID"));
        }
        NodeId::parse(self.id.trim()).map_err(|e| ValidationError::InvalidNodeId(e.to_string()))?;
        if self.topic.trim().is_empty() {
            return Err(ValidationError::InvalidTopic);
        }
        Ok(())
    }
}

fn default_topic() -> String {
    "cloud-bus".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_with_instance_is_kept() {
        let id = NodeConfig::new("producer:1").node_id().unwrap();
        assert_eq!(id.to_string(), "producer:1");
    }

    #[test]
    fn test_node_id_without_instance_gets_random_hex() {
        let id = NodeConfig::new("consumer").node_id().unwrap();
        assert_eq!(id.service(), "consumer");

        let instance = id.instance().unwrap();
        assert_eq!(instance.len(), 8);
        assert!(instance.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_validation_missing_id() {
        assert_eq!(
            NodeConfig::new("  ").validate(),
            Err(ValidationError::MissingRequired("NODE__ID"))
        );
    }

    #[test]
    fn test_validation_malformed_id() {
        assert!(matches!(
            NodeConfig::new("a:b:c").validate(),
            Err(ValidationError::InvalidNodeId(_))
        ));
    }

    #[test]
    fn test_validation_empty_topic() {
        let config = NodeConfig {
            topic: String::new(),
            ..NodeConfig::new("producer:1")
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTopic));
    }

    #[test]
    fn test_default_topic() {
        assert_eq!(NodeConfig::new("producer:1").topic, "cloud-bus");
    }
}
