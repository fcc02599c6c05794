use std::collections::HashMap;

use crate::common::PageId;

use super::PageRef;

const HEAD: usize = 0; // MRU sentinel
const TAIL: usize = 1; // LRU sentinel

struct Node {
    pid: PageId,
    page: Option<PageRef>, // None only for the sentinels
    prev: usize,
    next: usize,
}

/// Recency-ordered page cache: a doubly linked list threaded through an
/// index arena, with a `pid -> index` map alongside. Sentinel nodes at
/// both ends keep splicing branch-free and there are no reference cycles
/// to manage.
pub(crate) struct LruList {
    nodes: Vec<Node>,
    free: Vec<usize>,
    map: HashMap<PageId, usize>,
}

impl LruList {
    pub fn new() -> Self {
        let sentinel = |prev, next| Node {
            pid: PageId::new(0, 0),
            page: None,
            prev,
            next,
        };
        Self {
            nodes: vec![sentinel(HEAD, TAIL), sentinel(HEAD, TAIL)],
            free: Vec::new(),
            map: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    /// Looks a page up and promotes it to MRU.
    pub fn get(&mut self, pid: &PageId) -> Option<PageRef> {
        let idx = *self.map.get(pid)?;
        self.unlink(idx);
        self.link_front(idx);
        self.nodes[idx].page.clone()
    }

    /// Looks a page up without disturbing recency order.
    pub fn peek(&self, pid: &PageId) -> Option<PageRef> {
        let idx = *self.map.get(pid)?;
        self.nodes[idx].page.clone()
    }

    /// Installs a page at MRU, replacing the stored reference if the pid
    /// is already present. The caller enforces capacity.
    pub fn insert(&mut self, pid: PageId, page: PageRef) {
        if let Some(&idx) = self.map.get(&pid) {
            self.nodes[idx].page = Some(page);
            self.unlink(idx);
            self.link_front(idx);
            return;
        }
        let node = Node {
            pid,
            page: Some(page),
            prev: HEAD,
            next: TAIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.link_front(idx);
        self.map.insert(pid, idx);
    }

    pub fn remove(&mut self, pid: &PageId) -> Option<PageRef> {
        let idx = self.map.remove(pid)?;
        self.unlink(idx);
        let page = self.nodes[idx].page.take();
        self.free.push(idx);
        page
    }

    /// Entries from MRU to LRU.
    pub fn entries(&self) -> Vec<(PageId, PageRef)> {
        let mut out = Vec::with_capacity(self.len());
        let mut idx = self.nodes[HEAD].next;
        while idx != TAIL {
            let node = &self.nodes[idx];
            out.push((node.pid, node.page.clone().expect("sentinel inside list")));
            idx = node.next;
        }
        out
    }

    /// Entries from LRU to MRU, the order eviction considers victims in.
    pub fn lru_entries(&self) -> Vec<(PageId, PageRef)> {
        let mut out = self.entries();
        out.reverse();
        out
    }

    /// Cached page ids, MRU first.
    pub fn pids(&self) -> Vec<PageId> {
        self.entries().into_iter().map(|(pid, _)| pid).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config;
    use crate::storage::HeapPage;
    use crate::tuple::{FieldType, TupleDesc};
    use std::sync::{Arc, Mutex};

    fn page(pid: PageId) -> PageRef {
        let desc = TupleDesc::new(vec![(FieldType::Int, "x".to_string())]);
        let bytes = vec![0u8; config::page_size()];
        Arc::new(Mutex::new(HeapPage::new(pid, &bytes, desc).unwrap()))
    }

    fn pid(n: usize) -> PageId {
        PageId::new(1, n)
    }

    #[test]
    fn insert_orders_mru_first() {
        let mut lru = LruList::new();
        for n in 0..3 {
            lru.insert(pid(n), page(pid(n)));
        }
        assert_eq!(lru.pids(), vec![pid(2), pid(1), pid(0)]);
        assert_eq!(lru.len(), 3);
    }

    #[test]
    fn get_promotes_to_front() {
        let mut lru = LruList::new();
        for n in 0..3 {
            lru.insert(pid(n), page(pid(n)));
        }
        assert!(lru.get(&pid(0)).is_some());
        assert_eq!(lru.pids(), vec![pid(0), pid(2), pid(1)]);
    }

    #[test]
    fn peek_does_not_promote() {
        let mut lru = LruList::new();
        for n in 0..3 {
            lru.insert(pid(n), page(pid(n)));
        }
        assert!(lru.peek(&pid(0)).is_some());
        assert_eq!(lru.pids(), vec![pid(2), pid(1), pid(0)]);
    }

    #[test]
    fn remove_unlinks_and_reuses_slot() {
        let mut lru = LruList::new();
        for n in 0..3 {
            lru.insert(pid(n), page(pid(n)));
        }
        assert!(lru.remove(&pid(1)).is_some());
        assert_eq!(lru.pids(), vec![pid(2), pid(0)]);
        assert!(lru.get(&pid(1)).is_none());

        // freed arena slot is reused for the next insert
        let arena_len = lru.nodes.len();
        lru.insert(pid(9), page(pid(9)));
        assert_eq!(lru.nodes.len(), arena_len);
        assert_eq!(lru.pids(), vec![pid(9), pid(2), pid(0)]);
    }

    #[test]
    fn reinsert_replaces_and_promotes() {
        let mut lru = LruList::new();
        lru.insert(pid(0), page(pid(0)));
        lru.insert(pid(1), page(pid(1)));
        lru.insert(pid(0), page(pid(0)));
        assert_eq!(lru.len(), 2);
        assert_eq!(lru.pids(), vec![pid(0), pid(1)]);
    }

    #[test]
    fn lru_entries_reverse_of_entries() {
        let mut lru = LruList::new();
        for n in 0..4 {
            lru.insert(pid(n), page(pid(n)));
        }
        let mru: Vec<_> = lru.entries().into_iter().map(|(p, _)| p).collect();
        let mut lru_order: Vec<_> = lru.lru_entries().into_iter().map(|(p, _)| p).collect();
        lru_order.reverse();
        assert_eq!(mru, lru_order);
    }
}
