use std::fs;
use std::path::{Path, PathBuf};

use crate::common::Result;

/// On-disk directory layout of one database instance.
pub struct DbFiles {
    data_directory: PathBuf,
    log_directory: PathBuf,
}

impl DbFiles {
    pub fn new(root: &Path) -> Result<Self> {
        let data_directory = root.join("data");
        let log_directory = root.join("log");

        fs::create_dir_all(&data_directory)?;
        fs::create_dir_all(&log_directory)?;

        Ok(Self {
            data_directory,
            log_directory,
        })
    }

    pub fn table_file_path(&self, table_name: &str) -> PathBuf {
        self.data_directory.join(format!("{table_name}.dat"))
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.log_directory.join("wal.log")
    }
}
