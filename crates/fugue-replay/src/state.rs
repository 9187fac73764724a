//! Shared replay state
//!
//! [`ReplayState`] is the accumulator a replay run revolves around. It hands
//! out transaction numbers to workers, parks conflicted transactions until
//! their dependency commits, and buffers the surviving writes of the window
//! until they are flushed. Scheduling and buffering share one lock because
//! workers touch both on every transaction.

use crate::entry::VersionedKey;
use crate::heap::MinHeap;
use fugue_storage::{KvSink, StorageResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Ready queue length below which the work source is drained for more
pub const READY_LOW_WATERMARK: usize = 16;

struct Inner {
    work_source: Option<Box<dyn Iterator<Item = u64> + Send + Sync>>,
    ready: MinHeap<u64>,
    triggers: HashMap<u64, Vec<u64>>,
    done: HashSet<u64>,
    rollback_count: u64,
    changes: HashMap<String, BTreeMap<VersionedKey, Vec<u8>>>,
    size_estimate: u64,
}

/// Accumulator of scheduling state and buffered writes for one replay window.
///
/// All mutation goes through one `RwLock`; the type is shared across worker
/// threads behind an `Arc`.
pub struct ReplayState {
    inner: RwLock<Inner>,
}

impl ReplayState {
    /// Create an empty state with no work source
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                work_source: None,
                ready: MinHeap::new(),
                triggers: HashMap::new(),
                done: HashSet::new(),
                rollback_count: 0,
                changes: HashMap::new(),
                size_estimate: 0,
            }),
        }
    }

    /// Install the producer of transaction numbers to replay.
    ///
    /// The source must yield numbers in ascending order without duplicates.
    /// Replaces any previously installed source.
    pub fn set_work_source<I>(&self, source: I)
    where
        I: Iterator<Item = u64> + Send + Sync + 'static,
    {
        self.inner.write().work_source = Some(Box::new(source));
    }

    /// Hand out the next transaction number to execute.
    ///
    /// Tops the ready queue up from the work source while it holds fewer than
    /// [`READY_LOW_WATERMARK`] numbers, then pops the minimum. Returns `None`
    /// once both the queue and the source are exhausted; blocked transactions
    /// may still re-enter the queue through [`commit_tx_num`](Self::commit_tx_num).
    ///
    /// Panics if no work source was installed.
    pub fn schedule(&self) -> Option<u64> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;
        let source = match inner.work_source.as_mut() {
            Some(source) => source,
            None => panic!("schedule called before set_work_source"),
        };
        while inner.ready.len() < READY_LOW_WATERMARK {
            match source.next() {
                Some(tx_num) => inner.ready.push(tx_num),
                None => break,
            }
        }
        inner.ready.pop()
    }

    /// Record `tx_num` as done and release every transaction waiting on it
    /// back into the ready queue.
    pub fn commit_tx_num(&self, tx_num: u64) {
        let mut inner = self.inner.write();
        if let Some(waiters) = inner.triggers.remove(&tx_num) {
            for waiter in waiters {
                inner.ready.push(waiter);
            }
        }
        inner.done.insert(tx_num);
    }

    /// Park `tx_num` until `dependency` commits.
    ///
    /// If the dependency already committed (it may have landed between the
    /// worker reading state and reporting the conflict), `tx_num` goes
    /// straight back into the ready queue instead.
    pub fn rollback_tx_num(&self, tx_num: u64, dependency: u64) {
        let mut inner = self.inner.write();
        if inner.done.contains(&dependency) {
            inner.ready.push(tx_num);
        } else {
            inner.triggers.entry(dependency).or_default().push(tx_num);
        }
        inner.rollback_count += 1;
    }

    /// Check whether `tx_num` has committed
    pub fn done(&self, tx_num: u64) -> bool {
        self.inner.read().done.contains(&tx_num)
    }

    /// Number of committed transactions
    pub fn done_count(&self) -> u64 {
        self.inner.read().done.len() as u64
    }

    /// Number of rollbacks taken so far
    pub fn rollback_count(&self) -> u64 {
        self.inner.read().rollback_count
    }

    /// Buffer one mutation.
    ///
    /// A later put with the same `(tx_num, key1, key2)` replaces the earlier
    /// value. An empty value is a tombstone: it stays buffered but is never
    /// flushed.
    pub fn put(
        &self,
        table: &str,
        key1: Vec<u8>,
        key2: Option<Vec<u8>>,
        value: Vec<u8>,
        tx_num: u64,
    ) {
        let mut inner = self.inner.write();
        let key = VersionedKey::new(tx_num, key1, key2);
        let footprint = key.footprint(value.len());
        inner
            .changes
            .entry(table.to_string())
            .or_default()
            .insert(key, value);
        // Replacements still grow the estimate; it is an upper bound, not an
        // exact count.
        inner.size_estimate += footprint;
    }

    /// Look up a buffered value by its exact `(tx_num, key1, key2)` triple
    pub fn get(
        &self,
        table: &str,
        key1: &[u8],
        key2: Option<&[u8]>,
        tx_num: u64,
    ) -> Option<Vec<u8>> {
        let inner = self.inner.read();
        let probe = VersionedKey::new(tx_num, key1.to_vec(), key2.map(<[u8]>::to_vec));
        inner.changes.get(table)?.get(&probe).cloned()
    }

    /// Write all buffered entries into `sink` and clear the buffer.
    ///
    /// Entries flush per table in `VersionedKey` order; tombstones are
    /// skipped. Each table is cleared once fully written, and the size
    /// estimate resets only after every table succeeded. On a sink error the
    /// failing table keeps its entries, so the flush can be retried; flushed
    /// keys are deterministic, making the retry idempotent for any
    /// last-write-wins sink.
    pub fn flush(&self, sink: &mut dyn KvSink) -> StorageResult<()> {
        let mut inner = self.inner.write();
        let mut written = 0usize;
        for (table, entries) in inner.changes.iter_mut() {
            for (key, value) in entries.iter() {
                if value.is_empty() {
                    continue;
                }
                sink.put(table, &key.flush_key(), value)?;
                written += 1;
            }
            entries.clear();
        }
        inner.size_estimate = 0;
        tracing::debug!("Flushed {} entries from the replay buffer", written);
        Ok(())
    }

    /// Upper bound on the memory held by buffered entries
    pub fn size_estimate(&self) -> u64 {
        self.inner.read().size_estimate
    }
}

impl Default for ReplayState {
    fn default() -> Self {
        Self::new()
    }
}
