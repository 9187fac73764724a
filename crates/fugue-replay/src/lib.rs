//! # fugue-replay
//!
//! Parallel historical replay for Fugue.
//!
//! This crate provides:
//! - Dependency-aware scheduling of a transaction window
//! - Optimistic execution with rollback on read conflicts
//! - A last-writer gate that keeps only final per-key values
//! - A multi-versioned write buffer flushed in deterministic order
//!
//! ## Architecture
//!
//! ```text
//! +--------------------+
//! |    ReplayDriver    |  <- worker pool
//! +--------------------+
//!           |
//! +---------+----------+
//! | schedule | commit  |  <- dependency-aware ordering
//! +---------+----------+
//!           |
//! +--------------------+
//! |    ReplayWriter    |  <- last-writer gate per key
//! +--------------------+
//!           |
//! +--------------------+
//! |    ReplayState     |  <- multi-versioned write buffer
//! +--------------------+
//!           |
//!         flush
//!           v
//! +--------------------+
//! |       KvSink       |  <- RocksDB or any key-value sink
//! +--------------------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use fugue_replay::{ReplayDriver, ReplayState};
//! use std::sync::Arc;
//!
//! let state = Arc::new(ReplayState::new());
//! state.set_work_source(first_tx..last_tx);
//!
//! let driver = ReplayDriver::new(Arc::clone(&state), oracle);
//! let report = driver.run(&executor)?;
//!
//! state.flush(&mut db)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod driver;
mod entry;
mod heap;
mod oracle;
mod state;
mod writer;

pub use driver::{
    DriverConfig, DriverReport, ReplayDriver, TxExecutor, TxOutcome, DEFAULT_WORKER_THREADS,
};
pub use entry::{VersionedKey, ENTRY_OVERHEAD};
pub use heap::MinHeap;
pub use oracle::VersionOracle;
pub use state::{ReplayState, READY_LOW_WATERMARK};
pub use writer::ReplayWriter;
