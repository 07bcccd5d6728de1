//! Quorum-based distributed locks over independent Redis nodes (RedLock).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use redlock::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build the node pool once
//!     let factory = redlock::builder()
//!         .url("redis://10.0.0.1:6379")
//!         .url("redis://10.0.0.2:6379")
//!         .url("redis://10.0.0.3:6379")
//!         .ttl(Duration::from_secs(10))
//!         .build()
//!         .await?;
//!
//!     // Create a lock by resource name
//!     let mut lock = factory.create_lock("job-42");
//!
//!     if lock.acquire().await {
//!         // Critical section - we have exclusive access for at most the TTL
//!         println!("Doing critical work...");
//!         lock.release().await;
//!     }
//!
//!     // Or let a scope release it for us
//!     factory
//!         .with_lock("job-42", || async { println!("also exclusive") })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Guarantees
//!
//! - **Mutual exclusion**: a lock is held only when a majority of nodes stored
//!   this attempt's token and time is left on the TTL after drift.
//! - **Safe release**: a key is deleted only if it still holds our token.
//! - **Fault tolerance**: unreachable or slow nodes count as not acquired.
//! - **No fairness**: waiters are not queued; the lock expires after its TTL
//!   whether or not it was released.
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `redlock-core`: the store-agnostic protocol, at the crate root
//! - `redlock-redis`: the Redis lock store and factory builder, under
//!   [`redis`] with its main types also at the root
//!
//! For fine-grained control, you can depend on individual crates instead.

// Re-export core types and traits
pub use redlock_core::*;

// Re-export redis backend; its modules live under `redlock::redis`
pub use redlock_redis::{
    builder, connect, connect_lock, NodeConfig, RedisLockFactory, RedisLockFactoryBuilder,
    RedisLockStore, RedisReentrantLock, RedisRedLock,
};
pub use redlock_redis as redis;
