//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid host address: {0}")]
    InvalidHost(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("Invalid bus topic")]
    InvalidTopic,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Retry attempts must be at least 1")]
    InvalidRetryAttempts,

    #[error("Initial backoff exceeds maximum backoff")]
    InvalidBackoff,

    #[error("Dedup capacity must be at least 1")]
    InvalidDedupCapacity,
}
