//! RedLock handle: one resource, one pool, one set of options.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::error::LockResult;
use crate::options::RedLockOptions;
use crate::pool::NodePool;
use crate::redlock::{acquire_with_retry, release_redlock};
use crate::store::LockStore;
use crate::traits::DistributedLock;

/// State kept while the lock is held.
#[derive(Debug, Clone)]
struct HeldLock {
    /// Token stored on the quorum.
    token: String,
    /// Validity reported by the winning attempt.
    validity: Duration,
    /// When the winning attempt finished.
    acquired_at: Instant,
}

/// A distributed lock over a [`NodePool`], following the RedLock algorithm.
///
/// `Unlocked -> acquire succeeds -> Locked -> release -> Unlocked`. A failed
/// acquire leaves the lock `Unlocked`. Calling `acquire` while `Locked`
/// returns `false` and keeps the held token.
///
/// The token of the last successful acquisition outlives the `Locked` state,
/// so `release` can be repeated after a node failed to delete the key.
pub struct RedLock<S> {
    /// Store key.
    resource: String,
    /// Shared, read-only node pool.
    pool: Arc<NodePool<S>>,
    /// TTL and retry settings.
    options: RedLockOptions,
    /// Present while `Locked`.
    held: Option<HeldLock>,
    /// Token of the last successful acquisition; release retries use it.
    last_token: Option<String>,
}

impl<S: LockStore> RedLock<S> {
    /// Creates a lock for `resource` over a shared pool.
    pub fn new(
        resource: impl Into<String>,
        pool: Arc<NodePool<S>>,
        options: RedLockOptions,
    ) -> LockResult<Self> {
        options.validate()?;
        Ok(Self::new_unchecked(resource.into(), pool, options))
    }

    pub(crate) fn new_unchecked(
        resource: String,
        pool: Arc<NodePool<S>>,
        options: RedLockOptions,
    ) -> Self {
        Self {
            resource,
            pool,
            options,
            held: None,
            last_token: None,
        }
    }

    /// Gets the resource name.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Gets the options this lock was created with.
    pub fn options(&self) -> &RedLockOptions {
        &self.options
    }

    /// Gets the shared node pool.
    pub fn pool(&self) -> &Arc<NodePool<S>> {
        &self.pool
    }

    /// Quorum of the underlying pool.
    pub fn quorum(&self) -> usize {
        self.pool.quorum()
    }

    /// True between a successful `acquire` and the next `release`.
    pub fn is_locked(&self) -> bool {
        self.held.is_some()
    }

    /// Token of the current acquisition, if locked.
    pub fn token(&self) -> Option<&str> {
        self.held.as_ref().map(|held| held.token.as_str())
    }

    /// Validity left on the current acquisition.
    ///
    /// Counts down from the validity measured at acquisition time; `None` if
    /// not locked or already run out.
    pub fn validity(&self) -> Option<Duration> {
        let held = self.held.as_ref()?;
        held.validity
            .checked_sub(held.acquired_at.elapsed())
            .filter(|remaining| !remaining.is_zero())
    }

    /// Tries to acquire the lock. See [`DistributedLock::acquire`].
    #[instrument(skip(self), fields(lock.resource = %self.resource, nodes = self.pool.len(), quorum = self.pool.quorum(), ttl_ms = self.options.ttl.as_millis() as u64))]
    pub async fn acquire(&mut self) -> bool {
        if self.held.is_some() {
            warn!("acquire called on a lock that is already held");
            return false;
        }

        match acquire_with_retry(&self.pool, &self.resource, &self.options).await {
            Some(acquired) => {
                let validity = acquired.attempt.validity.unwrap_or_default();
                debug!(
                    attempts = acquired.attempts,
                    acquired = acquired.attempt.acquired_count(),
                    validity_ms = validity.as_millis() as u64,
                    "lock acquired"
                );
                self.last_token = Some(acquired.token.clone());
                self.held = Some(HeldLock {
                    token: acquired.token,
                    validity,
                    acquired_at: Instant::now(),
                });
                true
            }
            None => {
                warn!(
                    attempts = self.options.retry_times,
                    "could not acquire lock"
                );
                false
            }
        }
    }

    /// Releases the lock on every node. See [`DistributedLock::release`].
    ///
    /// Runs the release pass with the last acquired token even when the lock
    /// is no longer `Locked`; returns `false` only if it was never acquired.
    #[instrument(skip(self), fields(lock.resource = %self.resource, nodes = self.pool.len()))]
    pub async fn release(&mut self) -> bool {
        let was_held = self.held.take().is_some();
        let Some(token) = self.last_token.as_deref() else {
            debug!("release called on a lock that was never acquired");
            return false;
        };

        let released = release_redlock(
            &self.pool,
            &self.resource,
            token,
            self.options.timeouts().effective_node_timeout(),
        )
        .await;
        debug!(released, was_held, "lock released");
        true
    }

    /// Spawns the release pass on the current runtime and returns at once.
    ///
    /// The lock is `Unlocked` on return. Outside a Tokio runtime nothing is
    /// sent and the keys expire after the TTL.
    pub fn release_in_background(&mut self) {
        self.held = None;
        let Some(token) = self.last_token.clone() else {
            return;
        };

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(lock.resource = %self.resource, "no runtime to release on, lock expires after its ttl");
                return;
            }
        };

        let pool = self.pool.clone();
        let resource = self.resource.clone();
        let node_timeout = self.options.timeouts().effective_node_timeout();
        debug!(lock.resource = %resource, "releasing in background");
        runtime.spawn(async move {
            release_redlock(&pool, &resource, &token, node_timeout).await;
        });
    }
}

impl<S: LockStore> DistributedLock for RedLock<S> {
    fn resource(&self) -> &str {
        self.resource()
    }

    async fn acquire(&mut self) -> bool {
        self.acquire().await
    }

    async fn release(&mut self) -> bool {
        self.release().await
    }

    fn release_in_background(&mut self) {
        self.release_in_background()
    }
}

impl<S> fmt::Debug for RedLock<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedLock")
            .field("resource", &self.resource)
            .field("pool", &self.pool)
            .field("options", &self.options)
            .field("locked", &self.held.is_some())
            .finish()
    }
}
