//! Integration tests for Redis-backed RedLock.
//!
//! Need running Redis servers: `REDIS_URLS` (comma separated) or `REDIS_URL`,
//! defaulting to `redis://localhost:6379`. Run with `--ignored`.

use ::redlock::*;
use std::time::Duration;

/// Helper to get the Redis node URLs from environment or use default.
fn get_redis_urls() -> Vec<String> {
    if let Ok(urls) = std::env::var("REDIS_URLS") {
        return urls.split(',').map(|url| url.trim().to_string()).collect();
    }
    vec![std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())]
}

async fn factory(ttl: Duration) -> RedisLockFactory {
    builder()
        .nodes(get_redis_urls())
        .ttl(ttl)
        .build()
        .await
        .unwrap()
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_simple_lock() {
    let factory = factory(Duration::from_millis(1000)).await;
    let mut lock = factory.create_lock("test_simple_lock");

    let locked = lock.acquire().await;
    lock.release().await;
    assert!(locked);
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_scoped_lock() {
    let factory = factory(Duration::from_millis(1000)).await;
    let mut outer = factory.create_lock("test_scoped_lock");

    let inner_locked = outer
        .scoped(|| {
            let mut inner = factory.create_lock("test_scoped_lock");
            async move { inner.acquire().await }
        })
        .await
        .unwrap();
    assert!(!inner_locked);

    let mut lock = factory.create_lock("test_scoped_lock");
    assert!(lock.acquire().await);
    lock.release().await;
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_fail_to_lock_acquired() {
    let factory = factory(Duration::from_millis(1000)).await;
    let mut lock1 = factory.create_lock("test_fail_to_lock_acquired");
    let mut lock2 = factory.create_lock("test_fail_to_lock_acquired");

    let lock1_locked = lock1.acquire().await;
    let lock2_locked = lock2.acquire().await;
    lock1.release().await;

    assert!(lock1_locked);
    assert!(!lock2_locked);
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_lock_expire() {
    let factory = factory(Duration::from_millis(1000)).await;
    let mut lock1 = factory
        .create_lock_with(
            "test_lock_expire",
            RedLockOptions::new().with_ttl(Duration::from_millis(500)),
        )
        .unwrap();
    assert!(lock1.acquire().await);

    // Wait for lock to expire (longer than expiry time)
    tokio::time::sleep(Duration::from_millis(1000)).await;

    // lock1 has expired, so we can acquire it
    let mut lock2 = factory.create_lock("test_lock_expire");
    assert!(lock2.acquire().await);

    // lock1's stale release must not free lock2
    lock1.release().await;
    let mut lock3 = factory.create_lock("test_lock_expire");
    assert!(!lock3.acquire().await);

    lock2.release().await;
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_factory_create() {
    let factory = factory(Duration::from_secs(100)).await;
    let options = RedLockOptions::new()
        .with_ttl(Duration::from_millis(500))
        .with_retry_times(5)
        .with_retry_delay_max(Duration::from_millis(100));

    let lock = factory.create_lock_with("test_factory_create", options).unwrap();

    assert!(std::sync::Arc::ptr_eq(lock.pool(), factory.pool()));
    assert_eq!(lock.quorum(), factory.quorum());
    assert_eq!(lock.options().ttl, Duration::from_millis(500));
    assert_eq!(lock.options().retry_times, 5);
    assert_eq!(lock.options().retry_delay_max, Duration::from_millis(100));
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_release_script_checks_token() {
    let urls = get_redis_urls();
    let factory = builder().url(urls[0].clone()).build().await.unwrap();
    let store = &factory.pool().nodes()[0];

    assert!(store
        .try_set("test_release_script", "T1", Duration::from_secs(5))
        .await
        .unwrap());
    assert!(!store
        .compare_and_delete("test_release_script", "T2")
        .await
        .unwrap());
    assert!(store
        .compare_and_delete("test_release_script", "T1")
        .await
        .unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_reentrant_lock() {
    let factory = factory(Duration::from_millis(2000)).await;
    let mut lock = factory.create_reentrant_lock("test_reentrant_lock");
    let mut other = factory.create_lock("test_reentrant_lock");

    assert!(lock.acquire().await);
    assert!(lock.acquire().await);
    assert!(lock.release().await);
    assert!(!other.acquire().await);
    assert!(lock.release().await);
    assert!(other.acquire().await);
    other.release().await;
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_unreachable_node_counts_as_failure() {
    let mut urls = get_redis_urls();
    urls.truncate(1);
    // Two dead nodes out of three: no quorum possible
    let factory = builder()
        .nodes(urls)
        .url("redis://127.0.0.1:1")
        .url("redis://127.0.0.1:2")
        .connect_timeout(Duration::from_millis(200))
        .ttl(Duration::from_millis(1000))
        .retry_times(2)
        .build()
        .await
        .unwrap();

    let mut lock = factory.create_lock("test_unreachable_node");
    assert!(!lock.acquire().await);
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_connect_lock_standalone() {
    let options = RedLockOptions::new().with_ttl(Duration::from_millis(1000));
    let mut lock = connect_lock("test_connect_lock", get_redis_urls(), options)
        .await
        .unwrap();

    assert_eq!(lock.resource(), "test_connect_lock");
    assert_eq!(lock.options().ttl, Duration::from_millis(1000));
    assert!(lock.acquire().await);
    assert!(lock.release().await);
}

#[tokio::test]
#[ignore] // Requires Redis server running
async fn test_cancelled_scope_releases() {
    let factory = factory(Duration::from_secs(30)).await;
    let mut lock = factory.create_lock("test_cancelled_scope");

    let result = tokio::time::timeout(
        Duration::from_millis(200),
        lock.scoped(|| tokio::time::sleep(Duration::from_secs(10))),
    )
    .await;
    assert!(result.is_err());
    assert!(!lock.is_locked());

    tokio::time::sleep(Duration::from_millis(200)).await;
    let mut other = factory.create_lock("test_cancelled_scope");
    assert!(other.acquire().await);
    other.release().await;
}

#[test]
fn test_store_modules_are_reachable() {
    let memory = ::redlock::store::MemoryLockStore::new();
    assert!(memory.is_empty());
    assert!(::redlock::redis::store::RELEASE_SCRIPT_LUA.contains("redis.call('del'"));
    let _: Option<::redlock::redis::config::NodeConfig> = None;
}
