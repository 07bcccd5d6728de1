//! Redis lock store: `SET NX PX` to acquire, a Lua script to release.

use std::time::Duration;

use fred::prelude::*;
use redlock_core::error::{LockError, LockResult};
use redlock_core::store::LockStore;

/// Lua script to release the lock.
///
/// Runs atomically on the server, so no other client can slip in between the
/// comparison and the delete.
pub const RELEASE_SCRIPT_LUA: &str = r#"
    if redis.call('get', KEYS[1]) == ARGV[1] then
        return redis.call('del', KEYS[1])
    end
    return 0
"#;

/// One Redis node of a RedLock pool.
#[derive(Clone)]
pub struct RedisLockStore {
    client: RedisClient,
}

impl RedisLockStore {
    /// Wraps a (connected or connecting) client.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Gets the underlying client.
    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

impl LockStore for RedisLockStore {
    async fn try_set(&self, key: &str, token: &str, ttl: Duration) -> LockResult<bool> {
        let expiry_millis = ttl.as_millis().min(i64::MAX as u128) as i64;

        // SET NX returns Some("OK") if the key was set, None if it already exists
        let result: Option<String> = self
            .client
            .set(
                key,
                token,
                Some(Expiration::PX(expiry_millis)),
                Some(SetOptions::NX),
                false,
            )
            .await
            .map_err(|e| LockError::backend(format!("Redis SET NX failed: {}", e)))?;

        Ok(result.is_some())
    }

    async fn compare_and_delete(&self, key: &str, token: &str) -> LockResult<bool> {
        let deleted: i64 = self
            .client
            .eval(RELEASE_SCRIPT_LUA, key, token)
            .await
            .map_err(|e| LockError::backend(format!("Redis EVAL (release) failed: {}", e)))?;

        Ok(deleted == 1)
    }
}

impl std::fmt::Debug for RedisLockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisLockStore").finish_non_exhaustive()
    }
}
