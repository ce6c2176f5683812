//! Sharded hash index
//!
//! Maps a 32-bit key hash to an offset in the value log. The hash is reduced
//! modulo the shard count to pick one of N independently locked maps, so
//! operations on different shards never contend.
//!
//! Only the hash is stored, never the key. Two keys that collide on the
//! 32-bit hash share one slot and the later write wins.

use super::log::Offset;
use parking_lot::RwLock;
use serde::Serialize;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

/// Per-shard map from hashed key to log offset
type ShardMap = HashMap<u32, Offset, BuildHasherDefault<SipHasher13>>;

/// Identifier of a shard, only obtainable through [`ShardedIndex::route`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardId(usize);

impl ShardId {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Fixed set of independently locked index shards
pub struct ShardedIndex {
    shards: Vec<RwLock<ShardMap>>,
}

impl ShardedIndex {
    /// Create an index with `num_shards` empty shards
    pub fn new(num_shards: usize) -> Self {
        Self::with_capacity(num_shards, 0)
    }

    /// Create an index, spreading `capacity` slots across the shards
    pub fn with_capacity(num_shards: usize, capacity: usize) -> Self {
        assert!(num_shards > 0, "Number of shards must be > 0");

        let per_shard = capacity / num_shards;
        let shards = (0..num_shards)
            .map(|_| {
                RwLock::new(HashMap::with_capacity_and_hasher(
                    per_shard,
                    BuildHasherDefault::<SipHasher13>::default(),
                ))
            })
            .collect();

        ShardedIndex { shards }
    }

    /// Route a hashed key to its shard
    pub fn route(&self, hashed: u32) -> ShardId {
        ShardId(hashed as usize % self.shards.len())
    }

    /// Insert or overwrite the offset for `hashed`, returning the previous one
    pub fn set(&self, shard: ShardId, hashed: u32, offset: Offset) -> Option<Offset> {
        self.shards[shard.0].write().insert(hashed, offset)
    }

    /// Look up the offset for `hashed`
    ///
    /// Returns [`Offset::SENTINEL`] when the hash was never set.
    pub fn get(&self, shard: ShardId, hashed: u32) -> Offset {
        self.shards[shard.0]
            .read()
            .get(&hashed)
            .copied()
            .unwrap_or_default()
    }

    /// Get the number of shards
    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    /// Total number of hashed keys across all shards
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of hashed keys held by each shard
    pub fn shard_stats(&self) -> Vec<ShardStats> {
        self.shards
            .iter()
            .enumerate()
            .map(|(shard_id, shard)| ShardStats {
                shard_id,
                keys: shard.read().len(),
            })
            .collect()
    }

    /// Hold a shard's write lock
    #[cfg(test)]
    pub(crate) fn lock_shard(&self, shard: ShardId) -> parking_lot::RwLockWriteGuard<'_, ShardMap> {
        self.shards[shard.0].write()
    }
}

/// Statistics for a single shard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardStats {
    pub shard_id: usize,
    pub keys: usize,
}
