use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::{HeapDbError, PageId, Result, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogRecordKind {
    Begin = 0,
    Commit = 1,
    Abort = 2,
    Update = 3,
}

impl TryFrom<u8> for LogRecordKind {
    type Error = HeapDbError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(LogRecordKind::Begin),
            1 => Ok(LogRecordKind::Commit),
            2 => Ok(LogRecordKind::Abort),
            3 => Ok(LogRecordKind::Update),
            other => Err(HeapDbError::Corrupt(format!(
                "invalid log record kind: {other}"
            ))),
        }
    }
}

/// One decoded log record. Page id and images are present only on
/// `Update` records.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub kind: LogRecordKind,
    pub tid: TransactionId,
    pub pid: Option<PageId>,
    pub before: Option<Vec<u8>>,
    pub after: Option<Vec<u8>>,
}

/// Append-only write-ahead log.
///
/// Record wire format, all integers little-endian:
/// `[kind u8][tid u64]` for transaction records, plus
/// `[table_id u32][page_no u64][image_len u64][before][after]` on updates.
/// `force` fsyncs; the buffer pool never writes a dirty page to its heap
/// file before logging and forcing the matching update record.
pub struct LogManager {
    file: File,
    offset: u64,
    counts: HashMap<LogRecordKind, u64>,
}

impl LogManager {
    pub fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self {
            file,
            offset: 0,
            counts: HashMap::new(),
        })
    }

    fn append(&mut self, data: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(self.offset))?;
        self.file.write_all(data)?;
        self.offset += data.len() as u64;
        Ok(())
    }

    fn append_txn_record(&mut self, kind: LogRecordKind, tid: TransactionId) -> Result<()> {
        self.append(&[kind as u8])?;
        self.append(&tid.id().to_le_bytes())?;
        *self.counts.entry(kind).or_insert(0) += 1;
        Ok(())
    }

    pub fn log_txn_begin(&mut self, tid: TransactionId) -> Result<()> {
        self.append_txn_record(LogRecordKind::Begin, tid)
    }

    pub fn log_commit(&mut self, tid: TransactionId) -> Result<()> {
        self.append_txn_record(LogRecordKind::Commit, tid)
    }

    pub fn log_abort(&mut self, tid: TransactionId) -> Result<()> {
        self.append_txn_record(LogRecordKind::Abort, tid)
    }

    /// Appends an update record carrying both page images.
    pub fn log_write(
        &mut self,
        tid: TransactionId,
        pid: PageId,
        before: &[u8],
        after: &[u8],
    ) -> Result<()> {
        if before.len() != after.len() {
            return Err(HeapDbError::Corrupt(format!(
                "image sizes differ: {} vs {}",
                before.len(),
                after.len()
            )));
        }
        self.append(&[LogRecordKind::Update as u8])?;
        self.append(&tid.id().to_le_bytes())?;
        self.append(&pid.table_id.to_le_bytes())?;
        self.append(&(pid.page_no as u64).to_le_bytes())?;
        self.append(&(before.len() as u64).to_le_bytes())?;
        self.append(before)?;
        self.append(after)?;
        *self.counts.entry(LogRecordKind::Update).or_insert(0) += 1;
        Ok(())
    }

    /// Flushes the log to stable storage.
    pub fn force(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Reads every record written so far, in append order.
    pub fn records(&self) -> Result<Vec<LogRecord>> {
        let mut records = Vec::new();
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;

        fn read_u64(mut file: &File) -> Result<u64> {
            let mut buf = [0u8; 8];
            file.read_exact(&mut buf)?;
            Ok(u64::from_le_bytes(buf))
        }

        let mut pos = 0u64;
        while pos < self.offset {
            let mut kind_buf = [0u8; 1];
            file.read_exact(&mut kind_buf)?;
            let kind = LogRecordKind::try_from(kind_buf[0])?;
            let tid = TransactionId::from_raw(read_u64(file)?);
            pos += 1 + 8;

            let mut record = LogRecord {
                kind,
                tid,
                pid: None,
                before: None,
                after: None,
            };

            if kind == LogRecordKind::Update {
                let mut table_buf = [0u8; 4];
                file.read_exact(&mut table_buf)?;
                let table_id = u32::from_le_bytes(table_buf);
                let page_no = read_u64(file)? as usize;
                let len = read_u64(file)? as usize;

                let mut before = vec![0u8; len];
                file.read_exact(&mut before)?;
                let mut after = vec![0u8; len];
                file.read_exact(&mut after)?;

                record.pid = Some(PageId::new(table_id, page_no));
                record.before = Some(before);
                record.after = Some(after);
                pos += 4 + 8 + 8 + 2 * len as u64;
            }

            records.push(record);
        }

        Ok(records)
    }

    pub fn count_of(&self, kind: LogRecordKind) -> u64 {
        *self.counts.get(&kind).unwrap_or(&0)
    }

    pub fn total_records(&self) -> u64 {
        self.counts.values().sum()
    }
}
