//! The two primitives a lock store has to provide.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{LockError, LockResult};

// ============================================================================
// Lock Store Trait
// ============================================================================

/// A single independent key-value node participating in the quorum.
///
/// Implementations report communication problems as `Err`; the quorum logic
/// treats those as "not acquired" / "not released" on that node and never
/// propagates them further.
///
/// # Example
///
/// ```rust,ignore
/// if store.try_set("job-42", &token, Duration::from_secs(1)).await? {
///     // we own job-42 on this node for at most one second
///     store.compare_and_delete("job-42", &token).await?;
/// }
/// ```
pub trait LockStore: Send + Sync + 'static {
    /// Sets `key` to `token` with the given expiry, only if `key` is absent.
    ///
    /// Returns `Ok(true)` if the key was set.
    fn try_set(
        &self,
        key: &str,
        token: &str,
        ttl: Duration,
    ) -> impl Future<Output = LockResult<bool>> + Send;

    /// Deletes `key` only if its current value equals `token`.
    ///
    /// Must run as one atomic operation on the node. Returns `Ok(true)` if the
    /// key was deleted.
    fn compare_and_delete(
        &self,
        key: &str,
        token: &str,
    ) -> impl Future<Output = LockResult<bool>> + Send;
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug)]
struct Entry {
    token: String,
    expires_at: Instant,
}

/// In-process [`LockStore`] with per-key expiry.
///
/// Both primitives hold one mutex for their whole duration, so they are atomic
/// with respect to each other. Expiry uses [`tokio::time::Instant`] and follows
/// a paused test clock.
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryLockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live token stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.token.clone())
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|e| e.expires_at > now).count())
            .unwrap_or(0)
    }

    /// Returns true if no live keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> LockError {
        LockError::backend("memory store mutex poisoned")
    }
}

impl LockStore for MemoryLockStore {
    async fn try_set(&self, key: &str, token: &str, ttl: Duration) -> LockResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;

        if let Some(entry) = entries.get(key) {
            if entry.expires_at > now {
                return Ok(false);
            }
        }

        entries.insert(
            key.to_string(),
            Entry {
                token: token.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn compare_and_delete(&self, key: &str, token: &str) -> LockResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;

        let owned = entries
            .get(key)
            .is_some_and(|entry| entry.expires_at > now && entry.token == token);
        if owned {
            entries.remove(key);
        }
        Ok(owned)
    }
}
