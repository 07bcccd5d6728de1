//! Example: Using RedLock over several Redis servers
//!
//! Run with: `cargo run --example redis_lock`
//!
//! Requires Redis servers. Set REDIS_URLS (comma separated) or modify the
//! defaults below.

use ::redlock::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "redlock=debug".into()))
        .init();

    // Get Redis URLs from environment or use a single local node
    let urls: Vec<String> = std::env::var("REDIS_URLS")
        .map(|urls| urls.split(',').map(str::to_string).collect())
        .unwrap_or_else(|_| vec!["redis://127.0.0.1:6379/0".to_string()]);

    println!("Connecting to {} Redis node(s)...", urls.len());
    let factory = builder()
        .nodes(urls)
        .ttl(Duration::from_secs(10))
        .retry_times(3)
        .retry_delay_max(Duration::from_millis(200))
        .build()
        .await?;
    println!("Pool ready, quorum = {}", factory.quorum());

    // Create a lock by resource name
    let mut lock = factory.create_lock("example-resource");

    println!("Acquiring lock...");
    if lock.acquire().await {
        println!("Lock acquired, valid for another {:?}", lock.validity());

        // A second handle on the same resource is refused
        let mut contender = factory.create_lock("example-resource");
        println!("Contender acquired: {}", contender.acquire().await);

        tokio::time::sleep(Duration::from_secs(1)).await;
        lock.release().await;
        println!("Lock released");
    } else {
        println!("Could not acquire lock");
    }

    // Scoped acquisition: released no matter how the body ends
    let total = factory
        .with_lock("example-resource", || async {
            println!("Doing exclusive work...");
            tokio::time::sleep(Duration::from_millis(200)).await;
            42
        })
        .await?;
    println!("Scoped work returned {}", total);

    Ok(())
}
