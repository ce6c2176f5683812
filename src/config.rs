//! Configuration
//!
//! Every section derives serde so a JSON file can provide it. Missing fields
//! fall back to their defaults.

use crate::error::{StoreError, StoreResult};
use crate::store::HasherKind;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Largest `initial_capacity` accepted, in entries
pub const MAX_INITIAL_CAPACITY: usize = 1 << 24;

/// Storage engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Number of index shards
    pub num_shards: usize,

    /// Key hash algorithm
    pub hasher: HasherKind,

    /// Entries preallocated in the value log and index
    pub initial_capacity: usize,
}

impl StoreConfig {
    pub fn validate(&self) -> StoreResult<()> {
        if self.num_shards == 0 {
            return Err(StoreError::InvalidConfig(
                "num_shards must be greater than 0".to_string(),
            ));
        }
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(StoreError::InvalidConfig(format!(
                "initial_capacity {} exceeds the maximum of {}",
                self.initial_capacity, MAX_INITIAL_CAPACITY
            )));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            num_shards: 100,
            hasher: HasherKind::default(),
            initial_capacity: 1024,
        }
    }
}

/// Comparison Redis backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis URL (e.g., "redis://localhost:6379")
    pub url: String,

    /// Expiry applied to every SET, none by default
    pub ttl_secs: Option<u64>,
}

impl RedisConfig {
    /// Expiry to pass to `SETEX`, `None` means a plain `SET`
    ///
    /// A zero TTL is rejected by Redis, so it counts as no expiry.
    pub fn expiry(&self) -> Option<u64> {
        self.ttl_secs.filter(|&ttl| ttl > 0)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            url: "redis://localhost:6379".to_string(),
            ttl_secs: None,
        }
    }
}

/// Whole server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP bind address
    pub bind: SocketAddr,

    /// Tokio worker threads
    pub workers: usize,

    pub store: StoreConfig,

    /// Redis comparison backend, disabled when absent
    pub redis: Option<RedisConfig>,
}

impl ServerConfig {
    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            workers: num_cpus::get(),
            store: StoreConfig::default(),
            redis: None,
        }
    }
}
