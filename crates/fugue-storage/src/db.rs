//! RocksDB wrapper
//!
//! Each replay output table maps to a column family of the same name, so a
//! flushed window can be written straight into RocksDB through [`KvSink`].

use crate::error::{StorageError, StorageResult};
use crate::sink::KvSink;
use crate::tables;
use parking_lot::RwLock;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options,
};
use std::path::Path;
use std::sync::Arc;

type RocksDB = DBWithThreadMode<MultiThreaded>;

/// Database configuration
#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Create database if missing
    pub create_if_missing: bool,
    /// Maximum number of open files
    pub max_open_files: i32,
    /// Write buffer size
    pub write_buffer_size: usize,
    /// Maximum write buffers
    pub max_write_buffer_number: i32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            max_open_files: 512,
            write_buffer_size: 64 * 1024 * 1024, // 64MB
            max_write_buffer_number: 3,
        }
    }
}

/// RocksDB wrapper with one column family per replay table
pub struct Database {
    db: Arc<RwLock<Option<RocksDB>>>,
    path: String,
}

impl Database {
    /// Create a new database instance (not yet opened)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            db: Arc::new(RwLock::new(None)),
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    /// Open the database with default config
    pub fn open(&self) -> StorageResult<()> {
        self.open_with_config(DbConfig::default())
    }

    /// Open the database with custom config
    pub fn open_with_config(&self, config: DbConfig) -> StorageResult<()> {
        let mut db_guard = self.db.write();
        if db_guard.is_some() {
            return Err(StorageError::AlreadyOpen);
        }

        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(config.max_open_files);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = tables::ALL
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = RocksDB::open_cf_descriptors(&opts, &self.path, cf_descriptors)?;
        *db_guard = Some(db);
        tracing::info!("Opened replay database at {}", self.path);
        Ok(())
    }

    /// Close the database
    pub fn close(&self) {
        let mut db_guard = self.db.write();
        *db_guard = None;
    }

    /// Check if database is open
    pub fn is_open(&self) -> bool {
        self.db.read().is_some()
    }

    /// Get a value from a table
    pub fn get(&self, table: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StorageError::NotOpen)?;
        let cf = self.get_cf(db, table)?;
        Ok(db.get_cf(&cf, key)?)
    }

    /// Put a value into a table
    pub fn put(&self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StorageError::NotOpen)?;
        let cf = self.get_cf(db, table)?;
        db.put_cf(&cf, key, value)?;
        Ok(())
    }

    /// Get column family handle
    fn get_cf<'a>(
        &self,
        db: &'a RocksDB,
        name: &str,
    ) -> StorageResult<Arc<BoundColumnFamily<'a>>> {
        db.cf_handle(name)
            .ok_or_else(|| StorageError::UnknownTable(name.to_string()))
    }

    /// Get database path
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            path: self.path.clone(),
        }
    }
}

impl KvSink for Database {
    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        Database::put(self, table, key, value)
    }
}
