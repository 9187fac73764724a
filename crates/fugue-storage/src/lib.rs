//! # fugue-storage
//!
//! Durable storage layer for Fugue using RocksDB.
//!
//! This crate provides:
//! - Logical table names for replay output
//! - Account records with a fixed binary codec
//! - Key-value sink abstraction for ordered flushes
//! - RocksDB backend
//! - State writer trait driven during replay

#![warn(missing_docs)]
#![warn(clippy::all)]

mod account;
mod db;
mod error;
mod sink;
pub mod tables;
mod traits;

pub use account::{Account, EMPTY_CODE_HASH, EMPTY_STORAGE_ROOT};
pub use db::{Database, DbConfig};
pub use error::{StorageError, StorageResult};
pub use sink::{FailingSink, KvSink, MemorySink};
pub use traits::StateWriter;
