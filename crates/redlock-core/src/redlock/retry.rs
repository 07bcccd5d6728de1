//! Bounded retry loop around single acquisition attempts.

use std::time::Duration;

use tracing::debug;

use super::acquire::{acquire_redlock, AttemptResult};
use super::helper::RedLockHelper;
use super::release::release_redlock;
use crate::options::RedLockOptions;
use crate::pool::NodePool;
use crate::store::LockStore;

/// A successful acquisition: the token that won and the attempt that won it.
#[derive(Debug, Clone)]
pub struct Acquired {
    /// Token stored on the quorum; needed to release.
    pub token: String,
    /// The successful attempt.
    pub attempt: AttemptResult,
    /// 1-based index of the successful attempt.
    pub attempts: u32,
}

/// Acquires `resource` with up to `retry_times` attempts.
///
/// Every attempt uses a fresh token. A failed attempt is followed by a release
/// pass on all nodes and, unless it was the last one, a random sleep in
/// `[0, retry_delay_max]`. Returns `None` once the attempts are exhausted.
pub async fn acquire_with_retry<S: LockStore>(
    pool: &NodePool<S>,
    resource: &str,
    options: &RedLockOptions,
) -> Option<Acquired> {
    let timeouts = options.timeouts();
    let retry_times = options.retry_times;

    for attempt_no in 1..=retry_times {
        let token = RedLockHelper::create_lock_token();
        let attempt = acquire_redlock(pool, resource, &token, &timeouts).await;

        if attempt.is_successful() {
            return Some(Acquired {
                token,
                attempt,
                attempts: attempt_no,
            });
        }

        release_redlock(pool, resource, &token, timeouts.effective_node_timeout()).await;

        if attempt_no < retry_times {
            let delay = RedLockHelper::retry_delay(options.retry_delay_max);
            debug!(
                attempt = attempt_no,
                acquired = attempt.acquired_count(),
                delay_ms = delay.as_millis() as u64,
                "attempt failed, backing off"
            );
            sleep(delay).await;
        }
    }

    None
}

async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
