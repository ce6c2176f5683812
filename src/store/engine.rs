//! The store: hasher + value log + sharded index

use super::hasher::{HasherKind, KeyHasher};
use super::index::{ShardId, ShardStats, ShardedIndex};
use super::log::{Offset, ValueLog};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, info};

/// In-memory key-value store
///
/// `put` appends the value to the log first and publishes the offset in the
/// index second, so a concurrent `get` sees either the previous offset or
/// the new one, never a half-written slot.
pub struct Store<H = HasherKind> {
    hasher: H,
    log: ValueLog,
    index: ShardedIndex,
}

impl Store {
    /// Create a store using the configured hash algorithm
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        Self::with_hasher(config, config.hasher)
    }
}

impl<H: KeyHasher> Store<H> {
    /// Create a store with an explicit hasher
    pub fn with_hasher(config: &StoreConfig, hasher: H) -> StoreResult<Self> {
        config.validate()?;

        info!(
            "Initializing store with {} shards ({})",
            config.num_shards,
            std::any::type_name::<H>()
        );

        Ok(Store {
            hasher,
            log: ValueLog::with_capacity(config.initial_capacity),
            index: ShardedIndex::with_capacity(config.num_shards, config.initial_capacity),
        })
    }

    /// Store `value` under `key`, returning the log offset it landed at
    pub fn put(&self, key: &str, value: impl Into<Bytes>) -> StoreResult<Offset> {
        let hashed = self.hasher.hash_key(key.as_bytes());
        let offset = self.log.append(value)?;
        let shard = self.index.route(hashed);

        if let Some(previous) = self.index.set(shard, hashed, offset) {
            debug!(
                "Key '{}' on shard {} moved from offset {} to {}",
                key,
                shard.get(),
                previous,
                offset
            );
        }

        Ok(offset)
    }

    /// Fetch the value stored under `key`
    pub fn get(&self, key: &str) -> StoreResult<Bytes> {
        let offset = self.lookup(key)?;
        self.read_at(offset)
    }

    /// Fetch the value under `key` as a full entry, timestamp included
    pub fn get_entry(&self, key: &str) -> StoreResult<super::Entry> {
        let offset = self.lookup(key)?;
        self.log.entry(offset).inspect_err(|e| {
            error!("Index points past the value log for key '{}': {}", key, e);
        })
    }

    /// Read the log directly at `offset`
    pub fn read_at(&self, offset: Offset) -> StoreResult<Bytes> {
        self.log.read(offset).inspect_err(|e| {
            error!("Value log read failed: {}", e);
        })
    }

    fn lookup(&self, key: &str) -> StoreResult<Offset> {
        let hashed = self.hasher.hash_key(key.as_bytes());
        let offset = self.index.get(self.index.route(hashed), hashed);

        if offset.is_sentinel() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(offset)
    }

    /// Shard a key is routed to
    pub fn route_key(&self, key: &str) -> ShardId {
        self.index.route(self.hasher.hash_key(key.as_bytes()))
    }

    /// Get number of shards
    pub fn num_shards(&self) -> usize {
        self.index.num_shards()
    }

    /// Get statistics about the store
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            num_shards: self.index.num_shards(),
            indexed_keys: self.index.len(),
            log_entries: self.log.stored(),
            used_memory_bytes: self.log.memory_usage(),
            oldest_entry_age_secs: self.log.oldest_age().map(|age| age.as_secs()),
        }
    }

    /// Get detailed statistics for each shard
    pub fn shard_stats(&self) -> Vec<ShardStats> {
        self.index.shard_stats()
    }
}

/// Statistics about the store
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub num_shards: usize,
    /// Distinct hashed keys (colliding keys count once)
    pub indexed_keys: usize,
    /// Values ever appended, overwritten ones included
    pub log_entries: usize,
    pub used_memory_bytes: usize,
    pub oldest_entry_age_secs: Option<u64>,
}
