use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Default buffer pool capacity, in pages.
pub const DEFAULT_PAGES: usize = 50;

/// How long a page request spins on the lock table before the transaction
/// is aborted. Doubles as the deadlock detector.
pub const LOCK_WAIT_TIMEOUT: Duration = Duration::from_millis(500);

pub const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(1);

static PAGE_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_PAGE_SIZE);

pub fn page_size() -> usize {
    PAGE_SIZE.load(Ordering::Relaxed)
}

/// Testing hook. Changing the page size while files exist on disk
/// invalidates them.
pub fn set_page_size(size: usize) {
    PAGE_SIZE.store(size, Ordering::Relaxed);
}

/// Testing hook. Restores [`DEFAULT_PAGE_SIZE`].
pub fn reset_page_size() {
    PAGE_SIZE.store(DEFAULT_PAGE_SIZE, Ordering::Relaxed);
}
