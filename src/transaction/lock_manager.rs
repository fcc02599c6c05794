use std::collections::HashMap;
use std::sync::Mutex;

use crate::common::{PageId, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// Page-level lock table for two-phase locking.
///
/// For each page, either one transaction holds `Exclusive` or any number
/// hold `Shared`. `acquire` never blocks; callers poll it against their
/// own deadline. A sole shared holder asking for exclusive is upgraded in
/// place.
pub struct LockManager {
    table: Mutex<HashMap<PageId, HashMap<TransactionId, LockMode>>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Tries to grant `requested` on `pid` to `tid`. Returns false on
    /// conflict without changing any state.
    pub fn acquire(&self, pid: PageId, tid: TransactionId, requested: LockMode) -> bool {
        let mut table = self.table.lock().unwrap();
        let holders = table.entry(pid).or_default();

        if holders.is_empty() {
            holders.insert(tid, requested);
            return true;
        }

        if let Some(&held) = holders.get(&tid) {
            if holders.len() == 1 {
                // sole holder: grant, upgrading shared to exclusive in place
                if held == LockMode::Shared && requested == LockMode::Exclusive {
                    holders.insert(tid, LockMode::Exclusive);
                }
                return true;
            }
            // we share the page with others; another shared grant is a
            // no-op, an upgrade must wait for them to finish
            return requested == LockMode::Shared;
        }

        if requested == LockMode::Exclusive {
            return false;
        }
        if holders.values().any(|&m| m == LockMode::Exclusive) {
            return false;
        }
        holders.insert(tid, LockMode::Shared);
        true
    }

    pub fn holds_lock(&self, tid: TransactionId, pid: PageId) -> bool {
        let table = self.table.lock().unwrap();
        table.get(&pid).is_some_and(|h| h.contains_key(&tid))
    }

    /// The mode `tid` currently holds on `pid`, if any.
    pub fn mode_of(&self, tid: TransactionId, pid: PageId) -> Option<LockMode> {
        let table = self.table.lock().unwrap();
        table.get(&pid).and_then(|h| h.get(&tid)).copied()
    }

    /// Drops `tid`'s hold on `pid`. No-op if absent.
    pub fn release(&self, tid: TransactionId, pid: PageId) {
        let mut table = self.table.lock().unwrap();
        if let Some(holders) = table.get_mut(&pid) {
            holders.remove(&tid);
            if holders.is_empty() {
                table.remove(&pid);
            }
        }
    }

    /// Drops every lock `tid` holds, on transaction completion.
    pub fn release_all(&self, tid: TransactionId) {
        let mut table = self.table.lock().unwrap();
        table.retain(|_, holders| {
            holders.remove(&tid);
            !holders.is_empty()
        });
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}
