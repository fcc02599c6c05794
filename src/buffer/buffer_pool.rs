use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use log::{debug, warn};

use crate::catalog::Catalog;
use crate::common::{config, HeapDbError, PageId, Permissions, Result, TransactionId};
use crate::transaction::{LockManager, LockMode};
use crate::tuple::Tuple;
use crate::wal::LogManager;

use super::lru::LruList;
use super::PageRef;

/// Page cache between executors and heap files.
///
/// Every page access goes through [`get_page`](BufferPool::get_page),
/// which grants a page-level lock before returning. The pool runs
/// no-steal/force: a page dirtied by a live transaction is never written
/// out, and commit flushes (and logs) every page that transaction
/// dirtied. Eviction picks the least recently used clean page.
///
/// One monitor serializes cache and flush state; the lock table has its
/// own. Callers must not hold a page's mutex across pool calls.
pub struct BufferPool {
    cache: Mutex<LruList>,
    locks: LockManager,
    catalog: Arc<Catalog>,
    log: Arc<Mutex<LogManager>>,
    capacity: usize,
}

impl BufferPool {
    pub fn new(capacity: usize, catalog: Arc<Catalog>, log: Arc<Mutex<LogManager>>) -> Self {
        Self {
            cache: Mutex::new(LruList::new()),
            locks: LockManager::new(),
            catalog,
            log,
            capacity,
        }
    }

    /// Fetches a page, reading it from its heap file on a miss, and
    /// acquires a shared (read-only) or exclusive (read-write) lock for
    /// `tid`. Blocks by polling the lock table; a transaction that cannot
    /// get the lock within the deadline is aborted — this is the only
    /// deadlock-resolution mechanism.
    ///
    /// The page is installed at MRU before the lock is held, so a
    /// timed-out request still leaves it cached.
    pub fn get_page(&self, tid: TransactionId, pid: PageId, perm: Permissions) -> Result<PageRef> {
        let page = {
            let mut cache = self.cache.lock().unwrap();
            match cache.get(&pid) {
                Some(page) => page,
                None => {
                    if cache.len() >= self.capacity {
                        Self::evict(&mut cache)?;
                    }
                    let file = self.catalog.get_database_file(pid.table_id)?;
                    let page: PageRef = Arc::new(Mutex::new(file.read_page(pid)?));
                    cache.insert(pid, Arc::clone(&page));
                    page
                }
            }
        };

        let mode = match perm {
            Permissions::ReadOnly => LockMode::Shared,
            Permissions::ReadWrite => LockMode::Exclusive,
        };
        let deadline = Instant::now() + config::LOCK_WAIT_TIMEOUT;
        while !self.locks.acquire(pid, tid, mode) {
            if Instant::now() >= deadline {
                warn!("{tid} timed out waiting for {mode:?} on {pid}");
                return Err(HeapDbError::TransactionAborted);
            }
            thread::sleep(config::LOCK_RETRY_INTERVAL);
        }
        Ok(page)
    }

    /// Releases one page lock before the transaction completes. Breaks
    /// two-phase locking; only callers that never read the page may use
    /// it.
    pub fn unsafe_release_page(&self, tid: TransactionId, pid: PageId) {
        self.locks.release(tid, pid);
    }

    pub fn holds_lock(&self, tid: TransactionId, pid: PageId) -> bool {
        self.locks.holds_lock(tid, pid)
    }

    /// Inserts a tuple into `table_id` on behalf of `tid`, dirtying and
    /// re-installing every touched page at MRU.
    pub fn insert_tuple(&self, tid: TransactionId, table_id: u32, t: &mut Tuple) -> Result<()> {
        let file = self.catalog.get_database_file(table_id)?;
        let pages = file.insert_tuple(self, tid, t)?;
        self.install_dirty(tid, pages);
        Ok(())
    }

    /// Deletes the tuple named by its record id on behalf of `tid`.
    pub fn delete_tuple(&self, tid: TransactionId, t: &Tuple) -> Result<()> {
        let rid = t
            .record_id()
            .ok_or_else(|| HeapDbError::NotFound("tuple has no record id".to_string()))?;
        let file = self.catalog.get_database_file(rid.pid.table_id)?;
        let pages = file.delete_tuple(self, tid, t)?;
        self.install_dirty(tid, pages);
        Ok(())
    }

    fn install_dirty(&self, tid: TransactionId, pages: Vec<PageRef>) {
        let mut cache = self.cache.lock().unwrap();
        for page in pages {
            let pid = {
                let mut guard = page.lock().unwrap();
                guard.mark_dirty(Some(tid));
                guard.id()
            };
            cache.insert(pid, page);
        }
    }

    /// Commits or aborts `tid`, then releases all its locks.
    ///
    /// Commit walks the cache, logs and flushes every page `tid` dirtied,
    /// and re-snapshots each flushed page's before-image. Abort replaces
    /// each such page's contents with a fresh read from disk, so every
    /// outstanding reference observes the reverted bytes.
    pub fn transaction_complete(&self, tid: TransactionId, commit: bool) -> Result<()> {
        {
            let cache = self.cache.lock().unwrap();
            for (pid, page) in cache.entries() {
                let dirtied_by_tid = page.lock().unwrap().dirty_tid() == Some(tid);
                if !dirtied_by_tid {
                    continue;
                }
                if commit {
                    self.flush_entry(pid, &page)?;
                    page.lock().unwrap().set_before_image();
                } else {
                    let file = self.catalog.get_database_file(pid.table_id)?;
                    let fresh = file.read_page(pid)?;
                    *page.lock().unwrap() = fresh;
                    debug!("{tid} aborted, reverted {pid} from disk");
                }
            }
        }
        {
            let mut log = self.log.lock().unwrap();
            if commit {
                log.log_commit(tid)?;
            } else {
                log.log_abort(tid)?;
            }
            log.force()?;
        }
        self.locks.release_all(tid);
        Ok(())
    }

    /// Logs (before/after image, forced) and writes one dirty page, then
    /// clears its dirty flag. Caller holds the cache monitor.
    fn flush_entry(&self, pid: PageId, page: &PageRef) -> Result<()> {
        let mut guard = page.lock().unwrap();
        let Some(dirtier) = guard.dirty_tid() else {
            return Ok(());
        };
        let after = guard.page_data();
        {
            // WAL: the update record must be on stable storage before the
            // page bytes are
            let mut log = self.log.lock().unwrap();
            log.log_write(dirtier, pid, guard.before_image(), &after)?;
            log.force()?;
        }
        let file = self.catalog.get_database_file(pid.table_id)?;
        file.write_page(&guard)?;
        guard.mark_dirty(None);
        debug!("flushed {pid} for {dirtier}");
        Ok(())
    }

    /// Flushes one page if it is cached and dirty.
    pub fn flush_page(&self, pid: PageId) -> Result<()> {
        let cache = self.cache.lock().unwrap();
        if let Some(page) = cache.peek(&pid) {
            self.flush_entry(pid, &page)?;
        }
        Ok(())
    }

    /// Flushes every dirty page. Breaks no-steal if transactions are
    /// still running; meant for shutdown and tests.
    pub fn flush_all_pages(&self) -> Result<()> {
        let cache = self.cache.lock().unwrap();
        for (pid, page) in cache.entries() {
            self.flush_entry(pid, &page)?;
        }
        Ok(())
    }

    /// Drops a page from the cache without flushing it.
    pub fn discard_page(&self, pid: PageId) {
        self.cache.lock().unwrap().remove(&pid);
    }

    // Walks from the LRU end and drops the first clean page. Dirty pages
    // are never stolen; with every page dirty the miss cannot be served
    // and the requesting transaction aborts.
    fn evict(cache: &mut LruList) -> Result<()> {
        for (pid, page) in cache.lru_entries() {
            if page.lock().unwrap().dirty_tid().is_none() {
                debug!("evicting {pid}");
                cache.remove(&pid);
                return Ok(());
            }
        }
        warn!("eviction failed: every buffered page is dirty");
        Err(HeapDbError::TransactionAborted)
    }

    /// Cached page ids, most recently used first.
    pub fn cached_pids(&self) -> Vec<PageId> {
        self.cache.lock().unwrap().pids()
    }
}
