//! Bus transport and dedup configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::RetryPolicy;

/// Retry, reconnect and dedup tuning
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Publish/subscribe attempts before a transient failure escalates
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failed attempt, in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound for any single backoff, in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// First delay before re-subscribing after connection loss, in milliseconds
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Event ids remembered for duplicate suppression
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,

    /// Forget remembered ids after this many seconds (0 = capacity only)
    #[serde(default = "default_dedup_ttl_secs")]
    pub dedup_ttl_secs: u64,
}

impl BusConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
        }
    }

    /// Validate bus configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidRetryAttempts);
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ValidationError::InvalidBackoff);
        }
        if self.dedup_capacity == 0 {
            return Err(ValidationError::InvalidDedupCapacity);
        }
        Ok(())
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            dedup_capacity: default_dedup_capacity(),
            dedup_ttl_secs: default_dedup_ttl_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    50
}

fn default_max_backoff_ms() -> u64 {
    1_000
}

fn default_reconnect_delay_ms() -> u64 {
    500
}

fn default_dedup_capacity() -> usize {
    10_000
}

fn default_dedup_ttl_secs() -> u64 {
    600
}
