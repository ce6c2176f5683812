//! Entry structure for stored values

use bytes::Bytes;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A single value in the log
#[derive(Debug, Clone)]
pub struct Entry {
    /// The stored bytes, never mutated after creation
    pub value: Bytes,

    /// Insertion time (metadata only, nothing expires)
    pub created_at: SystemTime,
}

impl Entry {
    /// Create a new entry stamped with the current time
    pub fn new(value: impl Into<Bytes>) -> Self {
        Entry {
            value: value.into(),
            created_at: SystemTime::now(),
        }
    }

    /// The "no value" entry that occupies offset 0
    pub fn sentinel() -> Self {
        Entry {
            value: Bytes::new(),
            created_at: UNIX_EPOCH,
        }
    }

    /// Time elapsed since insertion
    pub fn age(&self) -> Duration {
        self.created_at.elapsed().unwrap_or_default()
    }

    /// Insertion time in milliseconds since the UNIX epoch
    pub fn created_at_millis(&self) -> u64 {
        self.created_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Calculate approximate memory usage of this entry in bytes
    pub fn memory_usage(&self) -> usize {
        self.value.len() + std::mem::size_of::<Entry>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_is_empty() {
        let entry = Entry::sentinel();
        assert!(entry.value.is_empty());
        assert_eq!(entry.created_at_millis(), 0);
    }

    #[test]
    fn test_new_entry_is_stamped() {
        let entry = Entry::new("hello");
        assert_eq!(entry.value, Bytes::from("hello"));
        assert!(entry.created_at_millis() > 0);
        assert!(entry.age() < Duration::from_secs(60));
    }
}
