//! Example: Nested acquisition with a reentrant lock
//!
//! Run with: `cargo run --example reentrant_lock`
//!
//! Requires a Redis server at REDIS_URL (default redis://127.0.0.1:6379/0).

use ::redlock::*;
use std::time::Duration;

async fn step(lock: &mut RedisReentrantLock, name: &str) -> LockResult<()> {
    lock.scoped(|| async move {
        println!("  {} runs under the lock", name);
    })
    .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string());
    let factory = builder().url(url).ttl(Duration::from_secs(5)).build().await?;

    let mut lock = factory.create_reentrant_lock("reentrant-example");

    if lock.acquire().await {
        println!("Outer acquire, depth {}", lock.depth());
        // Nested scopes do not contact Redis again
        step(&mut lock, "first step").await?;
        step(&mut lock, "second step").await?;
        lock.release().await;
        println!("Released, depth {}", lock.depth());
    }

    Ok(())
}
