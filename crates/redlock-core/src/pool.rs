//! The fixed, ordered set of nodes backing a lock.

use std::fmt;
use std::sync::Arc;

use crate::error::{LockError, LockResult};
use crate::redlock::RedLockHelper;
use crate::store::LockStore;

/// Ordered lock store clients plus the quorum derived from their count.
///
/// Immutable after construction. Wrap it in an [`Arc`] to share one pool
/// between many locks; every lock sharing it sees the same order and quorum.
pub struct NodePool<S> {
    nodes: Vec<Arc<S>>,
    quorum: usize,
}

impl<S: LockStore> NodePool<S> {
    /// Builds a pool from owned stores.
    pub fn new(stores: Vec<S>) -> LockResult<Self> {
        Self::from_shared(stores.into_iter().map(Arc::new).collect())
    }

    /// Builds a pool from stores that are already shared elsewhere.
    pub fn from_shared(nodes: Vec<Arc<S>>) -> LockResult<Self> {
        if nodes.is_empty() {
            return Err(LockError::InvalidConfiguration(
                "a node pool needs at least one lock store".to_string(),
            ));
        }

        let quorum = RedLockHelper::quorum(nodes.len());
        Ok(Self { nodes, quorum })
    }

    /// Builds a single-node pool.
    pub fn single(store: S) -> Self {
        Self {
            nodes: vec![Arc::new(store)],
            quorum: 1,
        }
    }
}

impl<S> NodePool<S> {
    /// The nodes, in configuration order.
    pub fn nodes(&self) -> &[Arc<S>] {
        &self.nodes
    }

    /// Number of nodes (N).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; an empty pool cannot be built.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Minimum number of nodes that must agree: `N/2 + 1`.
    pub fn quorum(&self) -> usize {
        self.quorum
    }
}

impl<S> fmt::Debug for NodePool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodePool")
            .field("nodes", &self.nodes.len())
            .field("quorum", &self.quorum)
            .finish()
    }
}
