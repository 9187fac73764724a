//! Flush sinks
//!
//! A sink receives the ordered `(table, key, value)` stream produced when the
//! replay buffer flushes. The RocksDB [`Database`](crate::Database) is the
//! production sink; [`MemorySink`] records writes for inspection.

use crate::error::{StorageError, StorageResult};
use std::collections::BTreeMap;

/// Ordered key-value flush target
pub trait KvSink {
    /// Write one key-value pair into a table
    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<()>;
}

/// In-memory sink recording every write in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    writes: Vec<(String, Vec<u8>, Vec<u8>)>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes in arrival order
    pub fn writes(&self) -> &[(String, Vec<u8>, Vec<u8>)] {
        &self.writes
    }

    /// Number of writes received
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Check if no writes were received
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Final value for every key of one table, last write winning
    pub fn table(&self, table: &str) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.writes
            .iter()
            .filter(|(t, _, _)| t == table)
            .map(|(_, key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Final value for one key of one table
    pub fn get(&self, table: &str, key: &[u8]) -> Option<&[u8]> {
        self.writes
            .iter()
            .rev()
            .find(|(t, k, _)| t == table && k == key)
            .map(|(_, _, value)| value.as_slice())
    }
}

impl KvSink for MemorySink {
    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.writes
            .push((table.to_string(), key.to_vec(), value.to_vec()));
        Ok(())
    }
}

/// Sink that accepts a fixed number of writes and then fails.
///
/// Used to exercise mid-flush failure handling.
pub struct FailingSink {
    inner: MemorySink,
    remaining: usize,
}

impl FailingSink {
    /// Create a sink that fails once `allowed` writes have been accepted
    pub fn after(allowed: usize) -> Self {
        Self {
            inner: MemorySink::new(),
            remaining: allowed,
        }
    }

    /// Writes accepted before the failure
    pub fn writes(&self) -> &[(String, Vec<u8>, Vec<u8>)] {
        self.inner.writes()
    }
}

impl KvSink for FailingSink {
    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        if self.remaining == 0 {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected sink failure",
            )));
        }
        self.remaining -= 1;
        self.inner.put(table, key, value)
    }
}
