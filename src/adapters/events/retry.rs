//! Retry and reconnect timing for the bus transport.

use std::time::Duration;

/// Bounded exponential backoff.
///
/// | Setting | Default | Description |
/// |---------|---------|-------------|
/// | `max_attempts` | 3 | Publish/subscribe attempts before giving up |
/// | `initial_backoff` | 50ms | Delay after the first failed attempt |
/// | `max_backoff` | 1s | Upper bound for any single delay |
/// | `reconnect_delay` | 500ms | First delay before re-subscribing after connection loss |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub reconnect_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(1),
            reconnect_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Policy with near-zero delays, for tests.
    pub fn immediate() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            reconnect_delay: Duration::from_millis(1),
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        Self::doubled(self.initial_backoff, attempt).min(self.max_backoff)
    }

    /// Delay before reconnect attempt number `attempt` (1-based).
    pub fn reconnect_backoff(&self, attempt: u32) -> Duration {
        let cap = self.max_backoff.max(self.reconnect_delay);
        Self::doubled(self.reconnect_delay, attempt).min(cap)
    }

    fn doubled(base: Duration, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        base.saturating_mul(1u32 << exponent)
    }
}
