//! RedLock algorithm implementation for distributed locking across multiple
//! independent stores.
//!
//! See https://redis.io/topics/distlock for the algorithm specification.

pub mod acquire;
pub mod helper;
pub mod release;
pub mod retry;
pub mod validity;

pub use acquire::{acquire_redlock, AttemptResult};
pub use helper::RedLockHelper;
pub use release::release_redlock;
pub use retry::{acquire_with_retry, Acquired};
pub use validity::{RedLockTimeouts, CLOCK_DRIFT_FACTOR, FIXED_OVERHEAD};
