pub mod buffer;
pub mod catalog;
pub mod common;
pub mod storage;
pub mod transaction;
pub mod tuple;
pub mod wal;

pub use buffer::{BufferPool, PageRef};
pub use catalog::Catalog;
pub use common::{HeapDbError, PageId, Permissions, RecordId, Result, TransactionId};
pub use storage::{DbFiles, HeapFile, HeapPage};
pub use transaction::{LockManager, LockMode};
pub use wal::LogManager;

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::common::config;
use crate::tuple::TupleDesc;

/// One database instance: catalog, write-ahead log, and buffer pool
/// wired together over a directory on disk. Tests and tools create their
/// own instead of sharing process globals.
pub struct Database {
    files: DbFiles,
    catalog: Arc<Catalog>,
    buffer_pool: Arc<BufferPool>,
    log: Arc<Mutex<LogManager>>,
}

impl Database {
    pub fn new(root: &Path) -> Result<Self> {
        Self::with_capacity(root, config::DEFAULT_PAGES)
    }

    /// Creates a database whose buffer pool caches at most `num_pages`
    /// pages.
    pub fn with_capacity(root: &Path, num_pages: usize) -> Result<Self> {
        let files = DbFiles::new(root)?;
        let catalog = Arc::new(Catalog::new());
        let log = Arc::new(Mutex::new(LogManager::new(&files.log_file_path())?));
        let buffer_pool = Arc::new(BufferPool::new(
            num_pages,
            Arc::clone(&catalog),
            Arc::clone(&log),
        ));
        Ok(Self {
            files,
            catalog,
            buffer_pool,
            log,
        })
    }

    /// Creates (or re-opens) a heap file under the data directory and
    /// registers it. Returns the table id.
    pub fn create_table(&self, name: &str, desc: TupleDesc) -> Result<u32> {
        let file = Arc::new(HeapFile::new(&self.files.table_file_path(name), desc)?);
        Ok(self.catalog.add_table(file, name))
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn buffer_pool(&self) -> &Arc<BufferPool> {
        &self.buffer_pool
    }

    pub fn log_manager(&self) -> Arc<Mutex<LogManager>> {
        Arc::clone(&self.log)
    }

    /// Allocates a transaction id and logs its begin record.
    pub fn begin_transaction(&self) -> Result<TransactionId> {
        let tid = TransactionId::new();
        self.log.lock().unwrap().log_txn_begin(tid)?;
        Ok(tid)
    }

    pub fn commit_transaction(&self, tid: TransactionId) -> Result<()> {
        self.buffer_pool.transaction_complete(tid, true)
    }

    pub fn abort_transaction(&self, tid: TransactionId) -> Result<()> {
        self.buffer_pool.transaction_complete(tid, false)
    }

    /// Shutdown path: flush everything and force the log. Not safe while
    /// transactions are in flight.
    pub fn close(&self) -> Result<()> {
        self.buffer_pool.flush_all_pages()?;
        self.log.lock().unwrap().force()
    }
}
