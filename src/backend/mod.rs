//! Key-value backends served over HTTP
//!
//! The local [`Store`](crate::store::Store) and the Redis comparison backend
//! share one contract so the same handlers can serve both.

mod local;

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "redis")]
pub use self::redis::RedisBackend;

use crate::error::StoreError;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors returned by a backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("key not found: {0}")]
    NotFound(String),

    /// The backend could not be reached
    #[error("connection error: {0}")]
    Connection(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => BackendError::NotFound(key),
            other => BackendError::Internal(other.to_string()),
        }
    }
}

/// Minimal set/get contract
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Store `value` under `key`
    async fn set(&self, key: &str, value: Bytes) -> Result<(), BackendError>;

    /// Fetch the value stored under `key`
    async fn get(&self, key: &str) -> Result<Bytes, BackendError>;
}

/// Turn a nil lookup into [`BackendError::NotFound`]
#[cfg(any(feature = "redis", test))]
pub(crate) fn found<T>(key: &str, value: Option<T>) -> Result<T, BackendError> {
    value.ok_or_else(|| BackendError::NotFound(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_is_not_found() {
        let err = found::<Vec<u8>>("missing", None).unwrap_err();
        assert!(matches!(err, BackendError::NotFound(key) if key == "missing"));

        assert_eq!(found("k", Some(vec![1u8])).unwrap(), vec![1u8]);
    }

    #[test]
    fn test_store_error_mapping() {
        let err = BackendError::from(StoreError::NotFound("k".to_string()));
        assert!(matches!(err, BackendError::NotFound(key) if key == "k"));

        let err = BackendError::from(StoreError::Internal("oom".to_string()));
        assert!(matches!(err, BackendError::Internal(_)));
    }
}
