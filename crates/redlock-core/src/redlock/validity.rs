//! Clock-drift-aware validity accounting.

use std::time::Duration;

/// Fraction of the TTL reserved for clock drift between nodes.
pub const CLOCK_DRIFT_FACTOR: f64 = 0.01;

/// Store-side expiry precision (1 ms) plus a 1 ms minimum drift for small TTLs.
pub const FIXED_OVERHEAD: Duration = Duration::from_millis(2);

/// Timeout configuration for one RedLock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedLockTimeouts {
    /// Lock expiry time (TTL set on each node).
    pub ttl: Duration,
    /// Upper bound for a single node round trip.
    pub node_timeout: Duration,
}

impl RedLockTimeouts {
    /// Creates a new timeout configuration.
    pub fn new(ttl: Duration, node_timeout: Duration) -> Self {
        Self { ttl, node_timeout }
    }

    /// `ttl * CLOCK_DRIFT_FACTOR + FIXED_OVERHEAD`.
    pub fn drift(&self) -> Duration {
        Duration::from_secs_f64(self.ttl.as_secs_f64() * CLOCK_DRIFT_FACTOR) + FIXED_OVERHEAD
    }

    /// Time left on the lock after an attempt that took `elapsed`.
    ///
    /// Returns `None` when `ttl - elapsed - drift` is not strictly positive.
    pub fn validity(&self, elapsed: Duration) -> Option<Duration> {
        self.ttl
            .checked_sub(elapsed)?
            .checked_sub(self.drift())
            .filter(|remaining| !remaining.is_zero())
    }

    /// Per-node timeout actually applied. Never longer than the TTL itself.
    pub fn effective_node_timeout(&self) -> Duration {
        self.node_timeout.min(self.ttl)
    }
}
