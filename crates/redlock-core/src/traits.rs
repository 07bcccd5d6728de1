//! Core traits for distributed locks.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::{LockError, LockResult};

// ============================================================================
// Distributed Lock Trait
// ============================================================================

/// A lock on one named resource with boolean acquire/release.
///
/// Implemented by [`RedLock`](crate::RedLock) and by
/// [`ReentrantLock`](crate::ReentrantLock), which decorates any other
/// implementation.
///
/// A single lock value is meant to be driven by one owner at a time; the
/// methods take `&mut self` for that reason.
///
/// # Example
///
/// ```rust,ignore
/// if lock.acquire().await {
///     // Critical section - we hold the lock
///     do_work().await;
///     lock.release().await;
/// }
/// ```
pub trait DistributedLock: Send {
    /// Returns the resource name this lock protects.
    fn resource(&self) -> &str;

    /// Tries to acquire the lock, retrying as configured.
    ///
    /// Never fails with an error: `false` means the lock was not obtained.
    fn acquire(&mut self) -> impl Future<Output = bool> + Send;

    /// Releases the lock.
    ///
    /// Best effort and safe to call when nothing is held. Returns `false` when
    /// there was nothing to release.
    fn release(&mut self) -> impl Future<Output = bool> + Send;

    /// Starts a release without waiting for it.
    ///
    /// Called when a scope holding the lock is dropped before it could
    /// release normally. Implementations spawn the release on the current
    /// Tokio runtime; outside a runtime the lock is left to expire.
    fn release_in_background(&mut self);

    /// Runs `body` while holding the lock.
    ///
    /// Fails with [`LockError::Acquisition`] if the lock cannot be obtained.
    /// Otherwise `release` is called exactly once after `body` finishes,
    /// including when it panics (the panic is resumed afterwards). If the
    /// returned future is dropped while the lock is held, for instance by a
    /// surrounding `tokio::time::timeout`, the release is handed to
    /// [`release_in_background`](Self::release_in_background).
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let report = lock.scoped(|| async { build_report().await }).await?;
    /// ```
    fn scoped<F, Fut, T>(&mut self, body: F) -> impl Future<Output = LockResult<T>> + Send
    where
        Self: Sized,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = T> + Send,
        T: Send,
    {
        async move {
            if !self.acquire().await {
                return Err(LockError::Acquisition {
                    resource: self.resource().to_string(),
                });
            }

            let mut guard = ScopeGuard { lock: Some(self) };
            let outcome = AssertUnwindSafe(body()).catch_unwind().await;
            guard.release().await;

            match outcome {
                Ok(value) => Ok(value),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
    }
}

/// Releases the lock of a scope that is dropped before finishing.
struct ScopeGuard<'a, L: DistributedLock> {
    lock: Option<&'a mut L>,
}

impl<L: DistributedLock> ScopeGuard<'_, L> {
    /// Releases in place and disarms the guard.
    async fn release(&mut self) {
        if let Some(lock) = self.lock.as_deref_mut() {
            lock.release().await;
        }
        self.lock = None;
    }
}

impl<L: DistributedLock> Drop for ScopeGuard<'_, L> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            lock.release_in_background();
        }
    }
}

// ============================================================================
// Provider Traits
// ============================================================================

/// Factory for creating distributed locks by resource name.
///
/// # Example
///
/// ```rust,ignore
/// // Configure once at startup
/// let factory = RedisLockFactory::builder().url("redis://a").url("redis://b").url("redis://c").build().await?;
///
/// // Create locks by name anywhere in the application
/// let mut lock = factory.create_lock("my-resource");
/// let locked = lock.acquire().await;
/// ```
pub trait LockProvider: Send + Sync {
    /// The lock type created by this provider.
    type Lock: DistributedLock;

    /// Creates a lock for the given resource.
    fn create_lock(&self, resource: &str) -> Self::Lock;
}

// ============================================================================
// Convenience Extensions
// ============================================================================

/// Extension trait providing convenience methods for lock providers.
pub trait LockProviderExt: LockProvider {
    /// Creates a lock for `resource` and runs `body` while holding it.
    ///
    /// Convenience method combining `create_lock` and `scoped`.
    fn with_lock<F, Fut, T>(
        &self,
        resource: &str,
        body: F,
    ) -> impl Future<Output = LockResult<T>> + Send
    where
        Self::Lock: Sized,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = T> + Send,
        T: Send,
    {
        let mut lock = self.create_lock(resource);
        async move { lock.scoped(body).await }
    }
}

// Blanket implementation for all LockProviders
impl<T: LockProvider> LockProviderExt for T {}
