use env_logger::Builder;
use log::{info, LevelFilter};

use heapdb::tuple::{Field, FieldType, Tuple, TupleDesc};
use heapdb::{Database, Result};

fn main() -> Result<()> {
    Builder::new().filter_level(LevelFilter::Info).init();

    let root = std::env::temp_dir().join("heapdb-demo");
    let db = Database::new(&root)?;

    let desc = TupleDesc::new(vec![
        (FieldType::Int, "id".to_string()),
        (FieldType::Str, "name".to_string()),
    ]);
    let table_id = db.create_table("people", desc.clone())?;
    for id in db.catalog().table_id_iterator() {
        let name = db.catalog().get_table_name(id)?;
        let schema = db.catalog().get_tuple_desc(id)?;
        let columns: Vec<&str> = (0..schema.num_fields())
            .map(|i| schema.field_name(i))
            .collect();
        info!("table '{}' (id {}): columns {}", name, id, columns.join(", "));
    }

    let tid = db.begin_transaction()?;
    for (id, name) in [(1, "ada"), (2, "grace"), (3, "edsger")] {
        let mut t = Tuple::new(
            desc.clone(),
            vec![Field::Int(id), Field::Str(name.to_string())],
        )?;
        db.buffer_pool().insert_tuple(tid, table_id, &mut t)?;
    }
    db.commit_transaction(tid)?;
    info!("{tid} inserted 3 rows and committed");

    let tid = db.begin_transaction()?;
    let file = db.catalog().get_database_file(table_id)?;
    let mut scan = file.iter(db.buffer_pool(), tid)?;
    while let Some(tuple) = scan.next()? {
        info!("row: {tuple}");
    }
    db.commit_transaction(tid)?;

    db.close()?;
    std::fs::remove_dir_all(&root)?;
    Ok(())
}
