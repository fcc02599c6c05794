use crate::common::{config, HeapDbError, PageId, RecordId, Result, TransactionId};
use crate::tuple::{Tuple, TupleDesc};

/// One fixed-size page of a heap file.
///
/// Layout on disk: a header bitmap of one bit per slot (LSB-first within
/// each byte), followed by `num_slots` fixed-width tuple records. The slot
/// count is derived so that header and slots together fit the page:
/// `num_slots = (page_size * 8) / (tuple_bits + 1)`.
#[derive(Debug)]
pub struct HeapPage {
    pid: PageId,
    desc: TupleDesc,
    header: Vec<u8>,
    tuples: Vec<Option<Tuple>>,
    num_slots: usize,
    dirty_tid: Option<TransactionId>,
    before_image: Vec<u8>,
}

impl HeapPage {
    /// Decodes a page from its on-disk bytes. The byte buffer becomes the
    /// page's before-image.
    pub fn new(pid: PageId, bytes: &[u8], desc: TupleDesc) -> Result<Self> {
        let page_size = config::page_size();
        if bytes.len() != page_size {
            return Err(HeapDbError::Corrupt(format!(
                "page buffer is {} bytes, expected {}",
                bytes.len(),
                page_size
            )));
        }

        let num_slots = Self::slots_per_page(&desc);
        let header_len = Self::header_len(num_slots);
        let tuple_len = desc.byte_size();
        let header = bytes[..header_len].to_vec();

        let mut tuples = Vec::with_capacity(num_slots);
        for slot in 0..num_slots {
            if header[slot / 8] & (1 << (slot % 8)) != 0 {
                let offset = header_len + slot * tuple_len;
                let mut t = Tuple::from_bytes(&desc, &bytes[offset..offset + tuple_len])?;
                t.set_record_id(Some(RecordId::new(pid, slot)));
                tuples.push(Some(t));
            } else {
                tuples.push(None);
            }
        }

        Ok(Self {
            pid,
            desc,
            header,
            tuples,
            num_slots,
            dirty_tid: None,
            before_image: bytes.to_vec(),
        })
    }

    /// Slots per page for a descriptor; the `+ 1` accounts for the header
    /// bit each slot costs.
    pub fn slots_per_page(desc: &TupleDesc) -> usize {
        (config::page_size() * 8) / (desc.byte_size() * 8 + 1)
    }

    fn header_len(num_slots: usize) -> usize {
        num_slots.div_ceil(8)
    }

    /// A zeroed page image: all slots empty.
    pub fn empty_page_data() -> Vec<u8> {
        vec![0u8; config::page_size()]
    }

    pub fn id(&self) -> PageId {
        self.pid
    }

    pub fn tuple_desc(&self) -> &TupleDesc {
        &self.desc
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    fn slot_used(&self, slot: usize) -> bool {
        self.header[slot / 8] & (1 << (slot % 8)) != 0
    }

    fn set_slot(&mut self, slot: usize, used: bool) {
        if used {
            self.header[slot / 8] |= 1 << (slot % 8);
        } else {
            self.header[slot / 8] &= !(1 << (slot % 8));
        }
    }

    pub fn num_empty_slots(&self) -> usize {
        (0..self.num_slots).filter(|&s| !self.slot_used(s)).count()
    }

    /// Occupied tuples in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter().filter_map(|t| t.as_ref())
    }

    /// Places the tuple in the first free slot and assigns its record id.
    pub fn insert_tuple(&mut self, t: &mut Tuple) -> Result<()> {
        if t.desc() != &self.desc {
            return Err(HeapDbError::SchemaMismatch(format!(
                "tuple schema does not match {}",
                self.pid
            )));
        }
        let slot = (0..self.num_slots)
            .find(|&s| !self.slot_used(s))
            .ok_or(HeapDbError::NoSpace(self.pid))?;
        t.set_record_id(Some(RecordId::new(self.pid, slot)));
        self.set_slot(slot, true);
        self.tuples[slot] = Some(t.clone());
        Ok(())
    }

    /// Clears the slot named by the tuple's record id.
    pub fn delete_tuple(&mut self, t: &Tuple) -> Result<()> {
        let rid = t
            .record_id()
            .ok_or_else(|| HeapDbError::NotFound("tuple has no record id".to_string()))?;
        if rid.pid != self.pid || rid.slot >= self.num_slots {
            return Err(HeapDbError::NotFound(format!(
                "record {:?} is not on {}",
                rid, self.pid
            )));
        }
        if !self.slot_used(rid.slot) {
            return Err(HeapDbError::NotFound(format!(
                "slot {} of {} is already empty",
                rid.slot, self.pid
            )));
        }
        self.set_slot(rid.slot, false);
        self.tuples[rid.slot] = None;
        Ok(())
    }

    /// `Some(tid)` while a still-active transaction has modified this page.
    pub fn dirty_tid(&self) -> Option<TransactionId> {
        self.dirty_tid
    }

    pub fn mark_dirty(&mut self, tid: Option<TransactionId>) {
        self.dirty_tid = tid;
    }

    /// Serializes header and slots back into a full page image.
    pub fn page_data(&self) -> Vec<u8> {
        let mut buf = vec![0u8; config::page_size()];
        let header_len = self.header.len();
        buf[..header_len].copy_from_slice(&self.header);
        let tuple_len = self.desc.byte_size();
        for (slot, tuple) in self.tuples.iter().enumerate() {
            if let Some(t) = tuple {
                let offset = header_len + slot * tuple_len;
                buf[offset..offset + tuple_len].copy_from_slice(&t.to_bytes());
            }
        }
        buf
    }

    /// Snapshot of the page bytes as of load time, or as of the last
    /// commit that flushed it.
    pub fn before_image(&self) -> &[u8] {
        &self.before_image
    }

    /// Re-snapshots the current contents. Called after a commit flush so
    /// the next transaction logs against the committed state.
    pub fn set_before_image(&mut self) {
        self.before_image = self.page_data();
    }
}
