use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::PageId;

/// Location of a tuple inside a heap file: the page it lives on and its
/// slot number within that page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub pid: PageId,
    pub slot: usize,
}

impl RecordId {
    pub fn new(pid: PageId, slot: usize) -> Self {
        Self { pid, slot }
    }
}

impl PartialOrd for RecordId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordId {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.pid.cmp(&other.pid) {
            Ordering::Equal => self.slot.cmp(&other.slot),
            other => other,
        }
    }
}
