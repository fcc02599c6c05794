mod buffer_pool;
mod lru;

pub use buffer_pool::BufferPool;

use std::sync::{Arc, Mutex};

use crate::storage::HeapPage;

/// Shared handle to a cached page. Hold the inner mutex only briefly and
/// never across a buffer pool call.
pub type PageRef = Arc<Mutex<HeapPage>>;
