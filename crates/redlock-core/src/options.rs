//! Per-lock configuration.

use std::time::Duration;

use crate::error::{LockError, LockResult};
use crate::redlock::RedLockTimeouts;

/// Default lock TTL.
pub const DEFAULT_TTL: Duration = Duration::from_millis(100_000);
/// Default number of acquisition attempts.
pub const DEFAULT_RETRY_TIMES: u32 = 3;
/// Default upper bound for the randomized backoff between attempts.
pub const DEFAULT_RETRY_DELAY_MAX: Duration = Duration::from_millis(200);
/// Default upper bound for one node round trip.
pub const DEFAULT_NODE_TIMEOUT: Duration = Duration::from_millis(50);

/// Settings shared by every acquisition made through one lock.
///
/// # Example
///
/// ```rust
/// use redlock_core::RedLockOptions;
/// use std::time::Duration;
///
/// let options = RedLockOptions::new()
///     .with_ttl(Duration::from_secs(1))
///     .with_retry_times(5)
///     .with_retry_delay_max(Duration::from_millis(100));
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedLockOptions {
    /// How long the key lives on each node.
    pub ttl: Duration,
    /// Maximum number of acquisition attempts.
    pub retry_times: u32,
    /// Upper bound of the random sleep between attempts.
    pub retry_delay_max: Duration,
    /// Per-node request timeout.
    pub node_timeout: Duration,
}

impl RedLockOptions {
    /// Creates options with the default settings.
    pub fn new() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            retry_times: DEFAULT_RETRY_TIMES,
            retry_delay_max: DEFAULT_RETRY_DELAY_MAX,
            node_timeout: DEFAULT_NODE_TIMEOUT,
        }
    }

    /// Sets how long the key lives on each node.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the maximum number of acquisition attempts.
    ///
    /// Zero means `acquire` gives up without contacting any node.
    pub fn with_retry_times(mut self, retry_times: u32) -> Self {
        self.retry_times = retry_times;
        self
    }

    /// Sets the upper bound of the random sleep between attempts.
    pub fn with_retry_delay_max(mut self, retry_delay_max: Duration) -> Self {
        self.retry_delay_max = retry_delay_max;
        self
    }

    /// Sets the per-node request timeout.
    pub fn with_node_timeout(mut self, node_timeout: Duration) -> Self {
        self.node_timeout = node_timeout;
        self
    }

    /// Timeout view used by the acquire algorithm.
    pub fn timeouts(&self) -> RedLockTimeouts {
        RedLockTimeouts::new(self.ttl, self.node_timeout)
    }

    /// Rejects settings no store can honour.
    pub fn validate(&self) -> LockResult<()> {
        if self.ttl < Duration::from_millis(1) {
            return Err(LockError::InvalidConfiguration(format!(
                "ttl must be at least 1ms, got {:?}",
                self.ttl
            )));
        }
        if self.node_timeout.is_zero() {
            return Err(LockError::InvalidConfiguration(
                "node timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RedLockOptions {
    fn default() -> Self {
        Self::new()
    }
}
