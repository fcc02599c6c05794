use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::common::{HeapDbError, Result};
use crate::storage::HeapFile;
use crate::tuple::TupleDesc;

struct TableEntry {
    file: Arc<HeapFile>,
    name: String,
}

/// In-memory registry mapping table ids to heap files and names.
pub struct Catalog {
    tables: Mutex<HashMap<u32, TableEntry>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a heap file under its own table id, replacing any table
    /// previously registered with that id.
    pub fn add_table(&self, file: Arc<HeapFile>, name: &str) -> u32 {
        let table_id = file.table_id();
        let mut tables = self.tables.lock().unwrap();
        tables.insert(
            table_id,
            TableEntry {
                file,
                name: name.to_string(),
            },
        );
        table_id
    }

    pub fn get_database_file(&self, table_id: u32) -> Result<Arc<HeapFile>> {
        let tables = self.tables.lock().unwrap();
        tables
            .get(&table_id)
            .map(|e| Arc::clone(&e.file))
            .ok_or(HeapDbError::UnknownTable(table_id))
    }

    pub fn get_table_name(&self, table_id: u32) -> Result<String> {
        let tables = self.tables.lock().unwrap();
        tables
            .get(&table_id)
            .map(|e| e.name.clone())
            .ok_or(HeapDbError::UnknownTable(table_id))
    }

    pub fn get_tuple_desc(&self, table_id: u32) -> Result<TupleDesc> {
        Ok(self.get_database_file(table_id)?.tuple_desc().clone())
    }

    /// Iterates over every registered table id.
    pub fn table_id_iterator(&self) -> impl Iterator<Item = u32> {
        self.tables
            .lock()
            .unwrap()
            .keys()
            .copied()
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
