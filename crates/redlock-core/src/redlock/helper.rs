//! RedLock helper functions.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::{LockError, LockResult};

/// Helper functions for RedLock algorithm.
pub struct RedLockHelper;

impl RedLockHelper {
    /// Number of nodes that must agree for N nodes: `N/2 + 1`.
    pub fn quorum(database_count: usize) -> usize {
        (database_count / 2) + 1
    }

    /// Checks if we have sufficient successes for majority consensus.
    pub fn has_sufficient_successes(success_count: usize, database_count: usize) -> bool {
        success_count >= Self::quorum(database_count)
    }

    /// Generates a fresh lock token for one acquisition attempt.
    ///
    /// 128 bits from the thread-local CSPRNG, rendered as 32 hex digits.
    pub fn create_lock_token() -> String {
        let mut rng = rand::thread_rng();
        let random: u128 = rng.r#gen();
        format!("{:032x}", random)
    }

    /// Draws a backoff uniformly from `[0, max]` at millisecond granularity.
    pub fn retry_delay(max: Duration) -> Duration {
        let max_millis = max.as_millis().min(u64::MAX as u128) as u64;
        let millis = rand::thread_rng().gen_range(0..=max_millis);
        Duration::from_millis(millis)
    }

    /// Runs one node call, turning an overrun into [`LockError::NodeTimeout`].
    pub async fn bounded<F>(timeout: Duration, call: F) -> LockResult<bool>
    where
        F: Future<Output = LockResult<bool>>,
    {
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LockError::NodeTimeout(timeout)),
        }
    }
}
