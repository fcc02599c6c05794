mod common;

use std::sync::Arc;
use std::thread;

use common::{fill_table, int_desc, setup};
use heapdb::{Database, HeapDbError, PageId, Permissions, Result, TransactionId};

fn one_page_db() -> (Arc<Database>, tempfile::TempDir, PageId) {
    let (db, dir) = setup(10);
    let table = db.create_table("t", int_desc()).unwrap();
    fill_table(&db, table, 1, 1).unwrap();
    (Arc::new(db), dir, PageId::new(table, 0))
}

#[test]
fn shared_readers_coexist() -> Result<()> {
    let (db, _dir, p0) = one_page_db();
    let pool = db.buffer_pool();
    let (a, b) = (TransactionId::new(), TransactionId::new());

    pool.get_page(a, p0, Permissions::ReadOnly)?;
    pool.get_page(b, p0, Permissions::ReadOnly)?;
    assert!(pool.holds_lock(a, p0));
    assert!(pool.holds_lock(b, p0));
    Ok(())
}

#[test]
fn sole_reader_upgrades_then_blocks_others() -> Result<()> {
    let (db, _dir, p0) = one_page_db();
    let a = TransactionId::new();

    db.buffer_pool().get_page(a, p0, Permissions::ReadOnly)?;
    // sole shared holder upgrades in place
    db.buffer_pool().get_page(a, p0, Permissions::ReadWrite)?;
    assert!(db.buffer_pool().holds_lock(a, p0));

    // a concurrent reader now times out
    let worker = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            let b = TransactionId::new();
            db.buffer_pool().get_page(b, p0, Permissions::ReadOnly)
        })
    };
    let err = worker.join().unwrap().unwrap_err();
    assert!(matches!(err, HeapDbError::TransactionAborted));
    Ok(())
}

#[test]
fn unsafe_release_lets_another_writer_in() -> Result<()> {
    let (db, _dir, p0) = one_page_db();
    let pool = db.buffer_pool();
    let (a, b) = (TransactionId::new(), TransactionId::new());

    pool.get_page(a, p0, Permissions::ReadWrite)?;
    pool.unsafe_release_page(a, p0);
    assert!(!pool.holds_lock(a, p0));

    pool.get_page(b, p0, Permissions::ReadWrite)?;
    assert!(pool.holds_lock(b, p0));
    Ok(())
}

#[test]
fn writer_excludes_reader_on_other_transaction() -> Result<()> {
    let (db, _dir, p0) = one_page_db();
    let a = TransactionId::new();
    db.buffer_pool().get_page(a, p0, Permissions::ReadWrite)?;

    let worker = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            let b = TransactionId::new();
            let started = std::time::Instant::now();
            let result = db.buffer_pool().get_page(b, p0, Permissions::ReadOnly);
            (result, started.elapsed())
        })
    };
    let (result, waited) = worker.join().unwrap();

    // the reader spun for the full deadline, then aborted
    assert!(matches!(result, Err(HeapDbError::TransactionAborted)));
    assert!(waited.as_millis() >= 450);
    // the writer's lock survives the aborted request
    assert!(db.buffer_pool().holds_lock(a, p0));
    Ok(())
}
