//! Redis lock factory construction.

use std::time::Duration;

use fred::prelude::*;
use redlock_core::error::LockResult;
use redlock_core::{NodePool, RedLock, RedLockFactory, RedLockOptions, ReentrantLock};
use tracing::{info, warn};

use crate::config::NodeConfig;
use crate::store::RedisLockStore;

/// Factory handing out locks over one shared set of Redis nodes.
pub type RedisLockFactory = RedLockFactory<RedisLockStore>;

/// A RedLock over Redis nodes.
pub type RedisRedLock = RedLock<RedisLockStore>;

/// A reentrant RedLock over Redis nodes.
pub type RedisReentrantLock = ReentrantLock<RedisRedLock>;

/// Builder for Redis lock factory configuration.
pub struct RedisLockFactoryBuilder {
    nodes: Vec<NodeConfig>,
    options: RedLockOptions,
    connect_timeout: Duration,
}

impl RedisLockFactoryBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            nodes: vec![],
            options: RedLockOptions::default(),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Adds one node.
    ///
    /// For RedLock, add several independent nodes (ideally 3 or 5).
    pub fn node(mut self, node: impl Into<NodeConfig>) -> Self {
        self.nodes.push(node.into());
        self
    }

    /// Adds multiple nodes, keeping their order.
    pub fn nodes<I>(mut self, nodes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<NodeConfig>,
    {
        self.nodes.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Adds a Redis server URL.
    pub fn url(self, url: impl Into<String>) -> Self {
        self.node(NodeConfig::Url(url.into()))
    }

    /// Adds a host/port/database descriptor.
    pub fn host(self, host: impl Into<String>, port: u16, db: u8) -> Self {
        self.node(NodeConfig::descriptor(host, port, db))
    }

    /// Uses an existing Redis client.
    pub fn client(self, client: RedisClient) -> Self {
        self.node(NodeConfig::Client(client))
    }

    /// Replaces all default lock options at once.
    pub fn options(mut self, options: RedLockOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the lock TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.options.ttl = ttl;
        self
    }

    /// Sets the number of acquisition attempts.
    pub fn retry_times(mut self, retry_times: u32) -> Self {
        self.options.retry_times = retry_times;
        self
    }

    /// Sets the upper bound of the backoff between attempts.
    pub fn retry_delay_max(mut self, retry_delay_max: Duration) -> Self {
        self.options.retry_delay_max = retry_delay_max;
        self
    }

    /// Sets the per-node request timeout.
    pub fn node_timeout(mut self, node_timeout: Duration) -> Self {
        self.options.node_timeout = node_timeout;
        self
    }

    /// Sets how long `build` waits for each node to come up.
    ///
    /// A node that is not up in time is kept and keeps reconnecting in the
    /// background; until then it simply counts as not acquired.
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Connects every node and builds the factory.
    pub async fn build(self) -> LockResult<RedisLockFactory> {
        self.options.validate()?;

        let nodes = if self.nodes.is_empty() {
            vec![NodeConfig::local()]
        } else {
            self.nodes
        };

        let mut stores = Vec::with_capacity(nodes.len());
        for (idx, node) in nodes.into_iter().enumerate() {
            let prebuilt = matches!(node, NodeConfig::Client(_));
            let client = node.into_client(Some(reconnect_policy()))?;
            if !prebuilt {
                wait_until_connected(idx, &client, self.connect_timeout).await;
            }
            stores.push(RedisLockStore::new(client));
        }

        let pool = NodePool::new(stores)?;
        info!(nodes = pool.len(), quorum = pool.quorum(), "redis lock pool ready");
        RedLockFactory::new(pool, self.options)
    }
}

impl Default for RedisLockFactoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a new builder for configuring a Redis lock factory.
pub fn builder() -> RedisLockFactoryBuilder {
    RedisLockFactoryBuilder::new()
}

/// Creates a factory over the given URLs with default options.
pub async fn connect<I>(urls: I) -> LockResult<RedisLockFactory>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    builder().nodes(urls.into_iter().map(|url| NodeConfig::Url(url.into()))).build().await
}

/// Connects `nodes` into a private pool and returns one lock on it.
///
/// For code that needs a single lock and no factory. An empty node list
/// uses the local default node.
pub async fn connect_lock<I>(
    resource: &str,
    nodes: I,
    options: RedLockOptions,
) -> LockResult<RedisRedLock>
where
    I: IntoIterator,
    I::Item: Into<NodeConfig>,
{
    let factory = builder().nodes(nodes).options(options).build().await?;
    factory.create_lock_with(resource, options)
}

fn reconnect_policy() -> ReconnectPolicy {
    // Unlimited attempts, 100ms doubling up to 30s.
    ReconnectPolicy::new_exponential(0, 100, 30_000, 2)
}

async fn wait_until_connected(idx: usize, client: &RedisClient, timeout: Duration) {
    client.connect();
    match tokio::time::timeout(timeout, client.wait_for_connect()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(node = idx, error = %e, "redis node not reachable yet"),
        Err(_) => warn!(node = idx, timeout = ?timeout, "redis node did not connect in time"),
    }
}
