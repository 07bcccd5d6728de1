//! Error types for RedLock operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during lock operations.
///
/// Only [`LockError::Acquisition`] and [`LockError::InvalidConfiguration`] ever
/// reach callers of the lock API. Node-level variants are produced by
/// [`LockStore`](crate::store::LockStore) implementations and absorbed by the
/// quorum logic.
#[derive(Error, Debug)]
pub enum LockError {
    /// Quorum could not be reached within the configured number of attempts.
    #[error("failed to acquire lock on {resource:?}")]
    Acquisition { resource: String },

    /// Building or connecting a store client failed.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A single node did not answer within the per-node timeout.
    #[error("node did not respond within {0:?}")]
    NodeTimeout(Duration),

    /// Invalid pool or lock configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LockError {
    /// Wraps any backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Backend(err.into())
    }

    /// Wraps any connection error.
    pub fn connection<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Connection(err.into())
    }
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
