//! Node connection descriptors.

use std::fmt;

use fred::prelude::*;
use redlock_core::error::{LockError, LockResult};

/// Host used when no node is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Port used when no node is configured.
pub const DEFAULT_PORT: u16 = 6379;
/// Database index used when no node is configured.
pub const DEFAULT_DB: u8 = 0;

/// How to reach one Redis node.
#[derive(Clone)]
pub enum NodeConfig {
    /// Plain host, port and database index.
    Descriptor { host: String, port: u16, db: u8 },
    /// A `redis://` or `rediss://` URL.
    Url(String),
    /// A client built by the caller. Used as is.
    Client(RedisClient),
}

impl NodeConfig {
    /// Creates a host/port/db descriptor.
    pub fn descriptor(host: impl Into<String>, port: u16, db: u8) -> Self {
        Self::Descriptor {
            host: host.into(),
            port,
            db,
        }
    }

    /// Creates a URL descriptor.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// The single local node used when nothing else is configured.
    pub fn local() -> Self {
        Self::descriptor(DEFAULT_HOST, DEFAULT_PORT, DEFAULT_DB)
    }

    /// Connection settings for descriptor and URL variants.
    ///
    /// Returns `Ok(None)` for a pre-built client.
    pub fn redis_config(&self) -> LockResult<Option<RedisConfig>> {
        match self {
            Self::Descriptor { host, port, db } => Ok(Some(RedisConfig {
                server: ServerConfig::new_centralized(host.as_str(), *port),
                database: Some(*db),
                ..Default::default()
            })),
            Self::Url(url) => RedisConfig::from_url(url).map(Some).map_err(|e| {
                LockError::Connection(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid Redis URL {:?}: {}", url, e),
                )))
            }),
            Self::Client(_) => Ok(None),
        }
    }

    /// Turns the descriptor into a client. Does not connect.
    pub fn into_client(self, policy: Option<ReconnectPolicy>) -> LockResult<RedisClient> {
        match self.redis_config()? {
            Some(config) => Ok(RedisClient::new(config, None, None, policy)),
            None => match self {
                Self::Client(client) => Ok(client),
                _ => Err(LockError::InvalidConfiguration(
                    "descriptor produced no client".to_string(),
                )),
            },
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::local()
    }
}

impl From<&str> for NodeConfig {
    fn from(url: &str) -> Self {
        Self::url(url)
    }
}

impl From<String> for NodeConfig {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<RedisClient> for NodeConfig {
    fn from(client: RedisClient) -> Self {
        Self::Client(client)
    }
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descriptor { host, port, db } => f
                .debug_struct("Descriptor")
                .field("host", host)
                .field("port", port)
                .field("db", db)
                .finish(),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Client(_) => f.write_str("Client(..)"),
        }
    }
}
