//! shardlog - an in-memory key-value cache over HTTP
//!
//! Values live in an append-only log; a hash-sharded index maps each key's
//! 32-bit hash to an offset in that log:
//! - `store`: the storage engine (hasher, value log, sharded index)
//! - `backend`: the set/get contract served over HTTP, local or Redis
//! - `web`: the HTTP transport
//! - `config`: serde-backed settings

pub mod backend;
pub mod config;
pub mod error;
pub mod store;
pub mod web;

/// Re-export commonly used types
pub use backend::{BackendError, KvBackend};
pub use config::{RedisConfig, ServerConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use store::{HasherKind, KeyHasher, Offset, Store};
