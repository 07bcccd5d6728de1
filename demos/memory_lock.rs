//! Example: RedLock over in-process stores, no server needed
//!
//! Run with: `cargo run --example memory_lock`

use redlock::prelude::*;
use redlock::{MemoryLockStore, RedLockFactory, RedLockOptions};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let options = RedLockOptions::new()
        .with_ttl(Duration::from_millis(1000))
        .with_retry_times(3)
        .with_retry_delay_max(Duration::from_millis(200));
    let factory =
        RedLockFactory::from_stores((0..3).map(|_| MemoryLockStore::new()).collect(), options)?;

    let mut first = factory.create_lock("job-42");
    let mut second = factory.create_lock("job-42");

    println!("first acquired:  {}", first.acquire().await);
    println!("second acquired: {}", second.acquire().await);

    first.release().await;
    let mut third = factory.create_lock("job-42");
    println!("third acquired after release: {}", third.acquire().await);
    third.release().await;

    Ok(())
}
