//! Key hashing
//!
//! Keys are reduced to a 32-bit hash before they reach the index. The hash
//! picks the shard and is also the lookup key inside that shard.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh32::xxh32;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// A deterministic, non-cryptographic 32-bit key hash
pub trait KeyHasher: Send + Sync {
    /// Hash the key bytes. Must be a pure function of its input.
    fn hash_key(&self, key: &[u8]) -> u32;
}

/// 32-bit FNV-1a
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1a;

impl KeyHasher for Fnv1a {
    fn hash_key(&self, key: &[u8]) -> u32 {
        key.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
        })
    }
}

/// xxHash32 with a zero seed
#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh32;

impl KeyHasher for Xxh32 {
    fn hash_key(&self, key: &[u8]) -> u32 {
        xxh32(key, 0)
    }
}

/// Hash algorithm selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    /// 32-bit FNV-1a
    #[default]
    Fnv1a,
    /// xxHash32
    Xxh32,
}

impl KeyHasher for HasherKind {
    fn hash_key(&self, key: &[u8]) -> u32 {
        match self {
            HasherKind::Fnv1a => Fnv1a.hash_key(key),
            HasherKind::Xxh32 => Xxh32.hash_key(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(Fnv1a.hash_key(b""), 0x811c_9dc5);
        assert_eq!(Fnv1a.hash_key(b"a"), 0xe40c_292c);
    }

    #[test]
    fn test_xxh32_known_values() {
        assert_eq!(Xxh32.hash_key(b""), 0x02cc_5d05);
    }

    #[test]
    fn test_hash_deterministic() {
        for kind in [HasherKind::Fnv1a, HasherKind::Xxh32] {
            assert_eq!(kind.hash_key(b"test_key"), kind.hash_key(b"test_key"));
            assert_ne!(kind.hash_key(b"test_key"), kind.hash_key(b"test_kez"));
        }
    }

    #[test]
    fn test_kind_delegates() {
        assert_eq!(HasherKind::Fnv1a.hash_key(b"key"), Fnv1a.hash_key(b"key"));
        assert_eq!(HasherKind::Xxh32.hash_key(b"key"), Xxh32.hash_key(b"key"));
    }

    #[test]
    fn test_fnv1a_known_collision() {
        assert_eq!(Fnv1a.hash_key(b"costarring"), Fnv1a.hash_key(b"liquid"));
    }

    #[test]
    fn test_kind_from_config() {
        let kind: HasherKind = serde_json::from_str("\"xxh32\"").unwrap();
        assert_eq!(kind, HasherKind::Xxh32);
        assert_eq!(HasherKind::default(), HasherKind::Fnv1a);
    }
}
