mod common;

use std::sync::Arc;
use std::thread;

use common::{int_str_desc, setup, str_row};
use heapdb::tuple::Field;
use heapdb::{Database, Result};

#[test]
fn insert_scan_delete_workflow() -> Result<()> {
    let (db, _dir) = setup(10);
    let desc = int_str_desc();
    let table = db.create_table("people", desc.clone())?;

    let tid = db.begin_transaction()?;
    let mut rows = Vec::new();
    for (id, name) in [(1, "ada"), (2, "grace"), (3, "edsger")] {
        let mut t = str_row(&desc, id, name);
        db.buffer_pool().insert_tuple(tid, table, &mut t)?;
        rows.push(t);
    }
    db.commit_transaction(tid)?;

    let tid = db.begin_transaction()?;
    db.buffer_pool().delete_tuple(tid, &rows[1])?;
    db.commit_transaction(tid)?;

    let tid = db.begin_transaction()?;
    let file = db.catalog().get_database_file(table)?;
    let mut scan = file.iter(db.buffer_pool(), tid)?;
    let mut ids = Vec::new();
    while let Some(t) = scan.next()? {
        if let Field::Int(id) = t.field(0) {
            ids.push(*id);
        }
    }
    db.commit_transaction(tid)?;

    assert_eq!(ids, vec![1, 3]);
    Ok(())
}

#[test]
fn committed_data_survives_reopen() -> Result<()> {
    let dir = tempfile::TempDir::new().unwrap();
    let desc = int_str_desc();

    {
        let db = Database::with_capacity(dir.path(), 10)?;
        let table = db.create_table("people", desc.clone())?;
        let tid = db.begin_transaction()?;
        let mut t = str_row(&desc, 7, "persistent");
        db.buffer_pool().insert_tuple(tid, table, &mut t)?;
        db.commit_transaction(tid)?;
        db.close()?;
    }

    // a fresh instance over the same directory sees the same table id
    // (derived from the file path) and the committed row
    let db = Database::with_capacity(dir.path(), 10)?;
    let table = db.create_table("people", desc.clone())?;
    let tid = db.begin_transaction()?;
    let file = db.catalog().get_database_file(table)?;
    let mut scan = file.iter(db.buffer_pool(), tid)?;
    let row = scan.next()?.unwrap();
    assert_eq!(row.field(0), &Field::Int(7));
    assert_eq!(row.field(1), &Field::Str("persistent".to_string()));
    assert!(scan.next()?.is_none());
    db.commit_transaction(tid)?;
    Ok(())
}

#[test]
fn catalog_reports_registered_tables() -> Result<()> {
    let (db, _dir) = setup(10);
    let people = db.create_table("people", int_str_desc())?;
    let orders = db.create_table("orders", int_str_desc())?;

    let mut ids: Vec<u32> = db.catalog().table_id_iterator().collect();
    ids.sort_unstable();
    let mut expected = vec![people, orders];
    expected.sort_unstable();
    assert_eq!(ids, expected);

    assert_eq!(db.catalog().get_table_name(people)?, "people");
    assert_eq!(db.catalog().get_table_name(orders)?, "orders");
    assert_eq!(db.catalog().get_tuple_desc(people)?, int_str_desc());

    let unregistered = (0..).find(|id| !ids.contains(id)).unwrap();
    assert!(db.catalog().get_table_name(unregistered).is_err());
    Ok(())
}

#[test]
fn concurrent_scans_share_pages() -> Result<()> {
    let (db, _dir) = setup(10);
    let desc = int_str_desc();
    let table = db.create_table("people", desc.clone())?;

    let tid = db.begin_transaction()?;
    for i in 0..40 {
        let mut t = str_row(&desc, i, "row");
        db.buffer_pool().insert_tuple(tid, table, &mut t)?;
    }
    db.commit_transaction(tid)?;

    let db = Arc::new(db);
    let mut workers = Vec::new();
    for _ in 0..4 {
        let db = Arc::clone(&db);
        workers.push(thread::spawn(move || -> Result<usize> {
            let tid = db.begin_transaction()?;
            let file = db.catalog().get_database_file(table)?;
            let mut scan = file.iter(db.buffer_pool(), tid)?;
            let mut count = 0;
            while scan.next()?.is_some() {
                count += 1;
            }
            db.commit_transaction(tid)?;
            Ok(count)
        }));
    }

    for worker in workers {
        assert_eq!(worker.join().unwrap()?, 40);
    }
    Ok(())
}
