//! RedLock release algorithm implementation.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::helper::RedLockHelper;
use crate::error::LockResult;
use crate::pool::NodePool;
use crate::store::LockStore;

/// Releases `token` on every node of the pool.
///
/// Runs on all nodes regardless of which ones accepted the key; the
/// compare-and-delete is a no-op where the token is not stored. Best effort:
/// node failures are logged and swallowed. Returns how many nodes actually
/// deleted the key.
pub async fn release_redlock<S: LockStore>(
    pool: &NodePool<S>,
    resource: &str,
    token: &str,
    node_timeout: Duration,
) -> usize {
    release_on_nodes(pool.nodes(), resource, token, node_timeout).await
}

pub(crate) async fn release_on_nodes<S: LockStore>(
    nodes: &[Arc<S>],
    resource: &str,
    token: &str,
    node_timeout: Duration,
) -> usize {
    let resource: Arc<str> = Arc::from(resource);
    let token: Arc<str> = Arc::from(token);

    // Start release attempts on all nodes in parallel
    let mut release_tasks: Vec<JoinHandle<LockResult<bool>>> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let node = node.clone();
        let resource = resource.clone();
        let token = token.clone();
        release_tasks.push(tokio::spawn(async move {
            RedLockHelper::bounded(node_timeout, node.compare_and_delete(&resource, &token)).await
        }));
    }

    let mut released = 0;
    for (idx, task) in release_tasks.into_iter().enumerate() {
        match task.await {
            Ok(Ok(true)) => released += 1,
            Ok(Ok(false)) => {}
            Ok(Err(e)) => {
                warn!(node = idx, error = %e, "lock store failed during release");
            }
            Err(e) => {
                warn!(node = idx, error = %e, "release task did not complete");
            }
        }
    }

    debug!(released, nodes = nodes.len(), "release pass finished");
    released
}
