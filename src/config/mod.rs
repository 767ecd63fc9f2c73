//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CLOUD_BUS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use cloud_bus::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Node {} on topic {}", config.node.id, config.node.topic);
//! ```

mod broker;
mod bus;
mod error;
mod features;
mod node;
mod redis;
mod server;

pub use broker::{BrokerConfig, BrokerKind};
pub use bus::BusConfig;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use node::NodeConfig;
pub use redis::RedisConfig;
pub use server::{LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Only `node.id` is required; every other value has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP trigger server (host, port, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Node identity and bus topic
    pub node: NodeConfig,

    /// Broker selection
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Redis connection, used when `broker.kind = redis`
    #[serde(default)]
    pub redis: RedisConfig,

    /// Retry, reconnect and dedup tuning
    #[serde(default)]
    pub bus: BusConfig,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Build a configuration with defaults everywhere except the node id.
    pub fn for_node(id: impl Into<String>) -> Self {
        Self {
            server: ServerConfig::default(),
            node: NodeConfig::new(id),
            broker: BrokerConfig::default(),
            redis: RedisConfig::default(),
            bus: BusConfig::default(),
            features: FeatureFlags::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CLOUD_BUS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CLOUD_BUS__NODE__ID=producer:1` -> `node.id = producer:1`
    /// - `CLOUD_BUS__BROKER__KIND=redis` -> `broker.kind = redis`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CLOUD_BUS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Redis settings are only checked when Redis is the selected broker.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.node.validate()?;
        if self.broker.kind == BrokerKind::Redis {
            self.redis.validate()?;
        }
        self.bus.validate()?;
        Ok(())
    }
}
