//! Redis comparison backend
//!
//! Used only to benchmark the local store against a mature cache.

use super::{found, BackendError, KvBackend};
use crate::config::RedisConfig;
use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

/// Redis-backed key-value backend
pub struct RedisBackend {
    config: RedisConfig,
    manager: ConnectionManager,
}

impl RedisBackend {
    /// Connect to Redis
    pub async fn connect(config: RedisConfig) -> Result<Self, BackendError> {
        debug!("Connecting to Redis at {}", config.url);

        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| BackendError::Connection(format!("Invalid Redis URL: {}", e)))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| BackendError::Connection(format!("Failed to connect: {}", e)))?;

        info!("Redis backend connected to {}", config.url);

        Ok(RedisBackend { config, manager })
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), BackendError> {
        let mut conn = self.manager.clone();
        let value = value.to_vec();

        let result = match self.config.expiry() {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await,
            None => conn.set::<_, _, ()>(key, value).await,
        };

        result.map_err(|e| BackendError::Connection(format!("Failed to set '{}': {}", key, e)))
    }

    async fn get(&self, key: &str) -> Result<Bytes, BackendError> {
        let mut conn = self.manager.clone();

        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| BackendError::Connection(format!("Failed to get '{}': {}", key, e)))?;

        found(key, value).map(Bytes::from)
    }
}
