//! Store-agnostic core of the RedLock distributed lock.
//!
//! A lock is taken by setting one key on a majority of independent stores
//! within a bounded time. This crate holds the protocol: quorum computation,
//! drift-aware validity, retries with jittered backoff, token-checked release
//! and a reentrant wrapper. Stores plug in through [`LockStore`].

pub mod error;
pub mod factory;
pub mod lock;
pub mod options;
pub mod pool;
pub mod prelude;
pub mod redlock;
pub mod reentrant;
pub mod store;
pub mod traits;

pub use error::{LockError, LockResult};
pub use factory::RedLockFactory;
pub use lock::RedLock;
pub use options::RedLockOptions;
pub use pool::NodePool;
pub use reentrant::ReentrantLock;
pub use store::{LockStore, MemoryLockStore};
pub use prelude::*;
