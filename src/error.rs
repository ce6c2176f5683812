//! Error types for the storage engine

use crate::store::Offset;
use thiserror::Error;

/// Errors surfaced by the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Log read outside `[0, len)`. Only reachable through a corrupted index.
    #[error("offset {offset} out of range for value log of length {len}")]
    OutOfRange { offset: Offset, len: usize },

    /// The key's hash was never inserted into its shard
    #[error("key not found: {0}")]
    NotFound(String),

    /// The value log could not grow
    #[error("internal failure: {0}")]
    Internal(String),

    /// Rejected configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used across the store
pub type StoreResult<T> = Result<T, StoreError>;
