pub mod config;

mod error;
pub use error::{HeapDbError, Result};

mod record_id;
pub use record_id::RecordId;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one page: the table it belongs to and its position within
/// that table's heap file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId {
    pub table_id: u32,
    pub page_no: usize,
}

impl PageId {
    pub fn new(table_id: u32, page_no: usize) -> Self {
        Self { table_id, page_no }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table {} page {}", self.table_id, self.page_no)
    }
}

static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque transaction identifier. Each transaction runs on one thread and
/// carries its id through every buffer pool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn new() -> Self {
        Self(NEXT_TXN_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }

    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn {}", self.0)
    }
}

/// Access level a transaction requests on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permissions {
    ReadOnly,
    ReadWrite,
}
