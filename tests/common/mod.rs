#![allow(dead_code)] // not every suite uses every helper

use std::sync::Arc;

use tempfile::TempDir;

use heapdb::storage::{HeapFile, HeapPage};
use heapdb::tuple::{Field, FieldType, Tuple, TupleDesc};
use heapdb::{Database, PageId, Result};

/// Database over a scratch directory with the given buffer pool capacity.
pub fn setup(capacity: usize) -> (Database, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = Database::with_capacity(dir.path(), capacity).unwrap();
    (db, dir)
}

/// Two-int schema: 504 slots per 4 KiB page.
pub fn int_desc() -> TupleDesc {
    TupleDesc::new(vec![
        (FieldType::Int, "a".to_string()),
        (FieldType::Int, "b".to_string()),
    ])
}

/// Int + string schema: 30 slots per 4 KiB page.
pub fn int_str_desc() -> TupleDesc {
    TupleDesc::new(vec![
        (FieldType::Int, "id".to_string()),
        (FieldType::Str, "name".to_string()),
    ])
}

pub fn int_row(desc: &TupleDesc, a: i32, b: i32) -> Tuple {
    Tuple::new(desc.clone(), vec![Field::Int(a), Field::Int(b)]).unwrap()
}

pub fn str_row(desc: &TupleDesc, id: i32, name: &str) -> Tuple {
    Tuple::new(
        desc.clone(),
        vec![Field::Int(id), Field::Str(name.to_string())],
    )
    .unwrap()
}

/// Writes `num_pages` pages straight through the heap file, bypassing the
/// buffer pool, with `rows_per_page` two-int tuples on each.
pub fn fill_table(
    db: &Database,
    table_id: u32,
    num_pages: usize,
    rows_per_page: usize,
) -> Result<Arc<HeapFile>> {
    let file = db.catalog().get_database_file(table_id)?;
    let desc = file.tuple_desc().clone();
    for page_no in 0..num_pages {
        let pid = PageId::new(table_id, page_no);
        let mut page = HeapPage::new(pid, &HeapPage::empty_page_data(), desc.clone())?;
        for row in 0..rows_per_page {
            let mut t = int_row(&desc, page_no as i32, row as i32);
            page.insert_tuple(&mut t)?;
        }
        file.write_page(&page)?;
    }
    Ok(file)
}
