//! Convenience prelude for RedLock types.

pub use crate::error::{LockError, LockResult};
pub use crate::traits::{DistributedLock, LockProvider, LockProviderExt};
