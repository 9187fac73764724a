//! Versioned buffer keys
//!
//! One comparator drives both the in-memory buffer order and the flush order:
//! entries sort by transaction number, then primary key, then secondary key.

use std::cmp::Ordering;
use std::mem;

/// Marker written before a present secondary key in the flushed form. Doubles
/// as the contract incarnation, which is always the first during replay.
const KEY2_MARKER: u64 = 1;

/// Key of one buffered mutation.
///
/// The secondary key is present only for storage slots; `None` sorts before
/// any present secondary key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionedKey {
    /// Transaction that produced the mutation
    pub tx_num: u64,
    /// Primary key (address or code hash)
    pub key1: Vec<u8>,
    /// Secondary key (storage slot), if any
    pub key2: Option<Vec<u8>>,
}

/// Fixed footprint charged per buffered entry: the key itself plus the value
/// handle, before any payload bytes.
pub const ENTRY_OVERHEAD: u64 = (mem::size_of::<VersionedKey>() + mem::size_of::<Vec<u8>>()) as u64;

impl VersionedKey {
    /// Create a key
    pub fn new(tx_num: u64, key1: Vec<u8>, key2: Option<Vec<u8>>) -> Self {
        Self { tx_num, key1, key2 }
    }

    /// Build the durable key this entry flushes under:
    /// big-endian transaction number, primary key, then the marker and
    /// secondary key when one is present.
    pub fn flush_key(&self) -> Vec<u8> {
        let mut key = match &self.key2 {
            None => Vec::with_capacity(8 + self.key1.len()),
            Some(key2) => Vec::with_capacity(8 + self.key1.len() + 8 + key2.len()),
        };
        key.extend_from_slice(&self.tx_num.to_be_bytes());
        key.extend_from_slice(&self.key1);
        if let Some(key2) = &self.key2 {
            key.extend_from_slice(&KEY2_MARKER.to_be_bytes());
            key.extend_from_slice(key2);
        }
        key
    }

    /// Bytes charged against the buffer size estimate for this entry and a
    /// value of `value_len` bytes
    pub fn footprint(&self, value_len: usize) -> u64 {
        let key2_len = self.key2.as_ref().map_or(0, Vec::len);
        ENTRY_OVERHEAD + (self.key1.len() + key2_len + value_len) as u64
    }
}

impl Ord for VersionedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tx_num
            .cmp(&other.tx_num)
            .then_with(|| self.key1.cmp(&other.key1))
            .then_with(|| self.key2.cmp(&other.key2))
    }
}

impl PartialOrd for VersionedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
