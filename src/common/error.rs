use thiserror::Error;

use super::PageId;

#[derive(Debug, Error)]
pub enum HeapDbError {
    #[error("transaction aborted")]
    TransactionAborted,

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("invalid page: {0}")]
    InvalidPage(PageId),

    #[error("no free slot on {0}")]
    NoSpace(PageId),

    #[error("tuple not found: {0}")]
    NotFound(String),

    #[error("unknown table {0}")]
    UnknownTable(u32),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("corrupt data: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, HeapDbError>;
