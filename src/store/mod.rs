//! Storage engine
//!
//! A hash-sharded index maps keys to offsets in an append-only value log.
//! This module is independent of the HTTP transport and of any external
//! backend.

mod engine;
mod entry;
mod hasher;
mod index;
mod log;

pub use engine::{Store, StoreStats};
pub use entry::Entry;
pub use hasher::{Fnv1a, HasherKind, KeyHasher, Xxh32};
pub use index::{ShardId, ShardStats, ShardedIndex};
pub use log::{Offset, ValueLog};
