//! Redis backend for RedLock distributed locks.

pub mod config;
pub mod provider;
pub mod store;

pub use config::NodeConfig;
pub use provider::{
    builder, connect, connect_lock, RedisLockFactory, RedisLockFactoryBuilder, RedisReentrantLock, RedisRedLock,
};
pub use store::RedisLockStore;
