//! Builds a node pool once and hands out locks that share it.

use std::fmt;
use std::sync::Arc;

use crate::error::LockResult;
use crate::lock::RedLock;
use crate::options::RedLockOptions;
use crate::pool::NodePool;
use crate::reentrant::ReentrantLock;
use crate::store::LockStore;
use crate::traits::LockProvider;

/// Provider for RedLock-based distributed locks.
///
/// Cloning is cheap; clones share the same pool. Every lock created by one
/// factory (or its clones) observes the same node order and quorum.
pub struct RedLockFactory<S> {
    /// Shared node pool.
    pool: Arc<NodePool<S>>,
    /// Defaults for `create_lock`.
    options: RedLockOptions,
}

impl<S: LockStore> RedLockFactory<S> {
    /// Creates a factory over an existing pool.
    pub fn new(pool: NodePool<S>, options: RedLockOptions) -> LockResult<Self> {
        Self::from_shared(Arc::new(pool), options)
    }

    /// Creates a factory over a pool that is already shared.
    pub fn from_shared(pool: Arc<NodePool<S>>, options: RedLockOptions) -> LockResult<Self> {
        options.validate()?;
        Ok(Self { pool, options })
    }

    /// Builds the pool from `stores` and wraps it.
    pub fn from_stores(stores: Vec<S>, options: RedLockOptions) -> LockResult<Self> {
        Self::new(NodePool::new(stores)?, options)
    }

    /// Gets the shared pool.
    pub fn pool(&self) -> &Arc<NodePool<S>> {
        &self.pool
    }

    /// Quorum shared by every lock of this factory.
    pub fn quorum(&self) -> usize {
        self.pool.quorum()
    }

    /// Default options used by `create_lock`.
    pub fn options(&self) -> &RedLockOptions {
        &self.options
    }

    /// Creates a lock with options other than the factory defaults.
    pub fn create_lock_with(
        &self,
        resource: &str,
        options: RedLockOptions,
    ) -> LockResult<RedLock<S>> {
        RedLock::new(resource, self.pool.clone(), options)
    }

    /// Creates a reentrant lock with the factory defaults.
    pub fn create_reentrant_lock(&self, resource: &str) -> ReentrantLock<RedLock<S>> {
        ReentrantLock::new(self.create_lock(resource))
    }
}

impl<S: LockStore> LockProvider for RedLockFactory<S> {
    type Lock = RedLock<S>;

    fn create_lock(&self, resource: &str) -> Self::Lock {
        // Options were validated when the factory was built.
        RedLock::new_unchecked(resource.to_string(), self.pool.clone(), self.options)
    }
}

impl<S> Clone for RedLockFactory<S> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            options: self.options,
        }
    }
}

impl<S> fmt::Debug for RedLockFactory<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedLockFactory")
            .field("pool", &self.pool)
            .field("options", &self.options)
            .finish()
    }
}
