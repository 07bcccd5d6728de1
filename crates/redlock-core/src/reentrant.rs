//! Same-owner reentrancy on top of any [`DistributedLock`].

use tracing::trace;

use crate::traits::DistributedLock;

/// Counts nested acquisitions by one logical owner.
///
/// Only the outermost `acquire` and the matching last `release` reach the
/// wrapped lock; nested calls just move the counter. This is not a shared
/// recursive lock: every clone of the owner must go through the same
/// `ReentrantLock` value.
///
/// # Example
///
/// ```rust,ignore
/// let mut lock = ReentrantLock::new(factory.create_lock("report"));
/// assert!(lock.acquire().await); // contacts the nodes
/// assert!(lock.acquire().await); // depth 2, no node contact
/// assert!(lock.release().await); // depth 1, no node contact
/// assert!(lock.release().await); // releases on the nodes
/// ```
#[derive(Debug)]
pub struct ReentrantLock<L> {
    inner: L,
    depth: usize,
}

impl<L: DistributedLock> ReentrantLock<L> {
    /// Wraps `inner`, starting unlocked.
    pub fn new(inner: L) -> Self {
        Self { inner, depth: 0 }
    }

    /// Current nesting depth; zero when the wrapped lock is not held.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Gets the wrapped lock.
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Unwraps the inner lock.
    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: DistributedLock> DistributedLock for ReentrantLock<L> {
    fn resource(&self) -> &str {
        self.inner.resource()
    }

    async fn acquire(&mut self) -> bool {
        if self.depth > 0 {
            self.depth += 1;
            trace!(depth = self.depth, "nested acquire");
            return true;
        }

        if self.inner.acquire().await {
            self.depth = 1;
            true
        } else {
            false
        }
    }

    async fn release(&mut self) -> bool {
        match self.depth {
            0 => false,
            1 => {
                self.depth = 0;
                self.inner.release().await
            }
            _ => {
                self.depth -= 1;
                trace!(depth = self.depth, "nested release");
                true
            }
        }
    }

    fn release_in_background(&mut self) {
        match self.depth {
            0 => {}
            1 => {
                self.depth = 0;
                self.inner.release_in_background();
            }
            _ => self.depth -= 1,
        }
    }
}
