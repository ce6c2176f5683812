//! Append-only value log
//!
//! Every stored value lands here exactly once. The index never holds values,
//! only offsets into this log, so an offset handed out by `append` stays
//! valid for the lifetime of the process.

use super::entry::Entry;
use crate::error::{StoreError, StoreResult};
use bytes::Bytes;
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Position of an entry in the value log
///
/// The default value is the sentinel, so a missing index slot and the
/// "no value" entry coincide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Offset(u64);

impl Offset {
    /// Reserved "no value" slot, created before any append
    pub const SENTINEL: Offset = Offset(0);

    pub fn new(raw: u64) -> Self {
        Offset(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_sentinel(self) -> bool {
        self == Self::SENTINEL
    }

    fn as_index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Append-only sequence of entries guarded by a single lock
///
/// Appends take the write lock with a blocking acquire. Reads take the
/// shared lock just long enough to clone the entry's `Bytes` handle.
pub struct ValueLog {
    entries: RwLock<Vec<Entry>>,

    /// Sum of `Entry::memory_usage` over all slots, kept by `append`
    used_bytes: AtomicUsize,
}

impl ValueLog {
    /// Create a log holding only the sentinel
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a log with room for `capacity` entries besides the sentinel
    pub fn with_capacity(capacity: usize) -> Self {
        let sentinel = Entry::sentinel();
        let used_bytes = AtomicUsize::new(sentinel.memory_usage());

        let mut entries = Vec::with_capacity(capacity.saturating_add(1));
        entries.push(sentinel);

        ValueLog {
            entries: RwLock::new(entries),
            used_bytes,
        }
    }

    /// Append a value and return its offset
    ///
    /// Offsets are strictly increasing across all callers.
    pub fn append(&self, value: impl Into<Bytes>) -> StoreResult<Offset> {
        let entry = Entry::new(value);
        let size = entry.memory_usage();

        let mut entries = self.entries.write();
        entries
            .try_reserve(1)
            .map_err(|e| StoreError::Internal(format!("value log append failed: {}", e)))?;
        entries.push(entry);
        self.used_bytes.fetch_add(size, Ordering::Relaxed);

        Ok(Offset((entries.len() - 1) as u64))
    }

    /// Read the bytes stored at `offset`
    pub fn read(&self, offset: Offset) -> StoreResult<Bytes> {
        self.with_entry(offset, |entry| entry.value.clone())
    }

    /// Read the whole entry stored at `offset`
    pub fn entry(&self, offset: Offset) -> StoreResult<Entry> {
        self.with_entry(offset, Entry::clone)
    }

    fn with_entry<T>(&self, offset: Offset, f: impl FnOnce(&Entry) -> T) -> StoreResult<T> {
        let entries = self.entries.read();
        offset
            .as_index()
            .and_then(|i| entries.get(i))
            .map(f)
            .ok_or(StoreError::OutOfRange {
                offset,
                len: entries.len(),
            })
    }

    /// Number of slots, sentinel included
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Always false: the sentinel is present from construction
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of values appended so far
    pub fn stored(&self) -> usize {
        self.len() - 1
    }

    /// Calculate approximate memory usage of the log in bytes
    pub fn memory_usage(&self) -> usize {
        self.used_bytes.load(Ordering::Relaxed)
    }

    /// Age of the first real entry, if any
    pub fn oldest_age(&self) -> Option<Duration> {
        self.entries.read().get(1).map(Entry::age)
    }
}

impl Default for ValueLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_sentinel_at_zero() {
        let log = ValueLog::new();
        assert_eq!(log.len(), 1);
        assert_eq!(log.stored(), 0);
        assert_eq!(log.read(Offset::SENTINEL).unwrap(), Bytes::new());
        assert_eq!(Offset::default(), Offset::SENTINEL);
    }

    #[test]
    fn test_append_starts_after_sentinel() {
        let log = ValueLog::new();
        assert_eq!(log.append("first").unwrap(), Offset::new(1));
        assert_eq!(log.append("second").unwrap(), Offset::new(2));

        assert_eq!(log.read(Offset::new(1)).unwrap(), Bytes::from("first"));
        assert_eq!(log.read(Offset::new(2)).unwrap(), Bytes::from("second"));
        assert_eq!(log.stored(), 2);
    }

    #[test]
    fn test_read_out_of_range() {
        let log = ValueLog::new();
        log.append("value").unwrap();

        let err = log.read(Offset::new(2)).unwrap_err();
        assert_eq!(
            err,
            StoreError::OutOfRange {
                offset: Offset::new(2),
                len: 2
            }
        );
        assert!(log.read(Offset::new(u64::MAX)).is_err());
    }

    #[test]
    fn test_entry_keeps_timestamp() {
        let log = ValueLog::new();
        let offset = log.append("value").unwrap();
        let entry = log.entry(offset).unwrap();

        assert_eq!(entry.value, Bytes::from("value"));
        assert!(entry.created_at_millis() > 0);
        assert!(log.oldest_age().is_some());
    }

    #[test]
    fn test_memory_usage_tracks_appends() {
        let log = ValueLog::new();
        let base = log.memory_usage();
        assert_eq!(base, Entry::sentinel().memory_usage());

        log.append(vec![0u8; 100]).unwrap();
        log.append("abc").unwrap();

        let expected = base + Entry::new(vec![0u8; 100]).memory_usage() + Entry::new("abc").memory_usage();
        assert_eq!(log.memory_usage(), expected);
    }

    #[test]
    fn test_memory_usage_while_append_lock_held() {
        let log = Arc::new(ValueLog::new());
        log.append("value").unwrap();
        let before = log.memory_usage();

        let _guard = log.entries.write();
        let (tx, rx) = std::sync::mpsc::channel();
        let reader = {
            let log = log.clone();
            std::thread::spawn(move || tx.send(log.memory_usage()).unwrap())
        };

        // Reading the counter never waits on the log lock
        let seen = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("memory_usage waited on the log lock");
        assert_eq!(seen, before);
        reader.join().unwrap();
    }

    #[test]
    fn test_concurrent_appends_unique_offsets() {
        let log = Arc::new(ValueLog::with_capacity(0));
        let threads = 8;
        let per_thread = 500;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let log = log.clone();
                std::thread::spawn(move || {
                    (0..per_thread)
                        .map(|i| log.append(format!("{}-{}", t, i)).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let offsets = handle.join().unwrap();
            // Each thread observes its own offsets in increasing order
            assert!(offsets.windows(2).all(|w| w[0] < w[1]));
            for offset in offsets {
                assert!(seen.insert(offset));
            }
        }

        let total = threads * per_thread;
        assert_eq!(seen.len(), total);
        assert!(seen.iter().all(|o| (1..=total as u64).contains(&o.get())));
        assert!(!seen.contains(&Offset::SENTINEL));
    }
}
