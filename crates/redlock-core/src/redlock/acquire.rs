//! RedLock acquire algorithm implementation.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::helper::RedLockHelper;
use super::release::release_on_nodes;
use super::validity::RedLockTimeouts;
use crate::error::LockResult;
use crate::pool::NodePool;
use crate::store::LockStore;

/// Outcome of a single acquisition attempt across the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult {
    /// Results indexed by node position (true = key set on that node).
    pub acquire_results: Vec<bool>,
    /// Quorum of the pool the attempt ran against.
    pub quorum: usize,
    /// Wall-clock time bracketing every node call of the attempt.
    pub elapsed: Duration,
    /// Drift margin subtracted from the TTL.
    pub drift: Duration,
    /// `ttl - elapsed - drift`, or `None` if that is not positive.
    pub validity: Option<Duration>,
}

impl AttemptResult {
    /// Applies the drift-compensated validity check to raw node results.
    pub fn evaluate(
        acquire_results: Vec<bool>,
        quorum: usize,
        elapsed: Duration,
        timeouts: &RedLockTimeouts,
    ) -> Self {
        Self {
            acquire_results,
            quorum,
            elapsed,
            drift: timeouts.drift(),
            validity: timeouts.validity(elapsed),
        }
    }

    /// Returns the number of nodes that accepted the key.
    pub fn acquired_count(&self) -> usize {
        self.acquire_results.iter().filter(|&&v| v).count()
    }

    /// Quorum reached and time still left on the lock.
    pub fn is_successful(&self) -> bool {
        self.acquired_count() >= self.quorum && self.validity.is_some()
    }
}

/// Node calls of one attempt that have not all been joined yet.
///
/// Dropped early when the caller's future is cancelled mid-attempt. The
/// calls still running are then awaited on a background task, which removes
/// the attempt's token from every node afterwards.
struct InFlightAttempt<S: LockStore> {
    nodes: Vec<Arc<S>>,
    resource: Arc<str>,
    token: Arc<str>,
    node_timeout: Duration,
    tasks: Vec<JoinHandle<LockResult<bool>>>,
    joined: usize,
}

impl<S: LockStore> Drop for InFlightAttempt<S> {
    fn drop(&mut self) {
        if self.joined == self.tasks.len() {
            return;
        }

        let pending = self.tasks.split_off(self.joined);
        let Ok(runtime) = Handle::try_current() else {
            warn!("attempt cancelled outside a runtime, keys expire after their ttl");
            return;
        };

        let nodes = std::mem::take(&mut self.nodes);
        let resource = self.resource.clone();
        let token = self.token.clone();
        let node_timeout = self.node_timeout;
        debug!(pending = pending.len(), "attempt cancelled, releasing in background");
        runtime.spawn(async move {
            for task in pending {
                let _ = task.await;
            }
            release_on_nodes(&nodes, &resource, &token, node_timeout).await;
        });
    }
}

/// Runs one acquisition attempt across every node of the pool.
///
/// All nodes are contacted in parallel and every result is collected before
/// deciding. A node that errors, panics or exceeds the per-node timeout counts
/// as not acquired; it never aborts the attempt. If the returned future is
/// dropped before every node answered, the attempt's token is released in the
/// background once the outstanding calls finish.
pub async fn acquire_redlock<S: LockStore>(
    pool: &NodePool<S>,
    resource: &str,
    token: &str,
    timeouts: &RedLockTimeouts,
) -> AttemptResult {
    let ttl = timeouts.ttl;
    let node_timeout = timeouts.effective_node_timeout();
    let resource: Arc<str> = Arc::from(resource);
    let token: Arc<str> = Arc::from(token);

    let start = Instant::now();

    // Start acquire attempts on all nodes in parallel
    let mut acquire_tasks: Vec<JoinHandle<LockResult<bool>>> = Vec::with_capacity(pool.len());
    for node in pool.nodes() {
        let node = node.clone();
        let resource = resource.clone();
        let token = token.clone();
        acquire_tasks.push(tokio::spawn(async move {
            RedLockHelper::bounded(node_timeout, node.try_set(&resource, &token, ttl)).await
        }));
    }

    let mut attempt = InFlightAttempt {
        nodes: pool.nodes().to_vec(),
        resource,
        token,
        node_timeout,
        tasks: acquire_tasks,
        joined: 0,
    };

    let mut acquire_results = Vec::with_capacity(attempt.tasks.len());
    while attempt.joined < attempt.tasks.len() {
        let idx = attempt.joined;
        let acquired = match (&mut attempt.tasks[idx]).await {
            Ok(Ok(acquired)) => acquired,
            Ok(Err(e)) => {
                warn!(node = idx, error = %e, "lock store failed during acquire");
                false
            }
            Err(e) => {
                warn!(node = idx, error = %e, "acquire task did not complete");
                false
            }
        };
        attempt.joined += 1;
        acquire_results.push(acquired);
    }

    let elapsed = start.elapsed();
    let result = AttemptResult::evaluate(acquire_results, pool.quorum(), elapsed, timeouts);

    debug!(
        acquired = result.acquired_count(),
        quorum = result.quorum,
        elapsed_us = elapsed.as_micros() as u64,
        drift_us = result.drift.as_micros() as u64,
        validity_ms = result.validity.map(|v| v.as_millis() as u64),
        "attempt finished"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLockStore;

    fn timeouts(ttl_ms: u64) -> RedLockTimeouts {
        RedLockTimeouts::new(Duration::from_millis(ttl_ms), Duration::from_millis(50))
    }

    #[test]
    fn quorum_with_time_left_succeeds() {
        let result = AttemptResult::evaluate(
            vec![true, true, true],
            2,
            Duration::from_millis(5),
            &timeouts(1000),
        );
        assert_eq!(result.acquired_count(), 3);
        assert_eq!(result.drift, Duration::from_millis(12));
        assert_eq!(result.validity, Some(Duration::from_millis(983)));
        assert!(result.is_successful());
    }

    #[test]
    fn quorum_without_time_left_fails() {
        let result = AttemptResult::evaluate(
            vec![true, true, true],
            2,
            Duration::from_millis(995),
            &timeouts(1000),
        );
        assert_eq!(result.validity, None);
        assert!(!result.is_successful());
    }

    #[test]
    fn minority_fails_even_with_time_left() {
        let result = AttemptResult::evaluate(
            vec![true, false, false],
            2,
            Duration::from_millis(1),
            &timeouts(1000),
        );
        assert!(result.validity.is_some());
        assert!(!result.is_successful());
    }

    #[tokio::test]
    async fn acquires_every_free_node() {
        let pool = NodePool::new(vec![
            MemoryLockStore::new(),
            MemoryLockStore::new(),
            MemoryLockStore::new(),
        ])
        .unwrap();

        let result = acquire_redlock(&pool, "job-42", "token-a", &timeouts(1000)).await;
        assert_eq!(result.acquire_results, vec![true, true, true]);
        assert!(result.is_successful());

        for node in pool.nodes() {
            assert_eq!(node.get("job-42").as_deref(), Some("token-a"));
        }

        let second = acquire_redlock(&pool, "job-42", "token-b", &timeouts(1000)).await;
        assert_eq!(second.acquired_count(), 0);
        assert!(!second.is_successful());
    }
}
