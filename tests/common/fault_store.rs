//! Lock store that can be made slow or unreachable.

use redlock_core::error::{LockError, LockResult};
use redlock_core::store::{LockStore, MemoryLockStore};
use redlock_core::NodePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a node does before serving a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    /// Every call fails with a backend error.
    Unreachable,
    /// Every call is delayed.
    Latency(Duration),
}

/// Memory store with fault injection and call counters.
#[derive(Debug)]
pub struct FaultyStore {
    inner: MemoryLockStore,
    fault: Mutex<Fault>,
    set_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::with_fault(Fault::None)
    }

    pub fn with_fault(fault: Fault) -> Self {
        Self {
            inner: MemoryLockStore::new(),
            fault: Mutex::new(fault),
            set_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_fault(&self, fault: Fault) {
        *self.fault.lock().unwrap() = fault;
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    async fn apply_fault(&self) -> LockResult<()> {
        let fault = *self.fault.lock().unwrap();
        match fault {
            Fault::None => Ok(()),
            Fault::Unreachable => Err(LockError::backend("connection refused")),
            Fault::Latency(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

impl LockStore for FaultyStore {
    async fn try_set(&self, key: &str, token: &str, ttl: Duration) -> LockResult<bool> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_fault().await?;
        self.inner.try_set(key, token, ttl).await
    }

    async fn compare_and_delete(&self, key: &str, token: &str) -> LockResult<bool> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_fault().await?;
        self.inner.compare_and_delete(key, token).await
    }
}

/// Builds a shared pool of `n` healthy nodes.
pub fn pool(n: usize) -> Arc<NodePool<FaultyStore>> {
    Arc::new(NodePool::new((0..n).map(|_| FaultyStore::new()).collect()).unwrap())
}

/// Builds a shared pool with one store per fault.
pub fn pool_with(faults: &[Fault]) -> Arc<NodePool<FaultyStore>> {
    Arc::new(NodePool::new(faults.iter().map(|f| FaultyStore::with_fault(*f)).collect()).unwrap())
}
