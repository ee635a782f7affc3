//! Delimited-text writer for processed tables.

use std::fs;
use std::path::Path;

use super::source::DataTable;
use crate::error::{Result, SceneCheckError};

/// Write a table as delimited text, creating parent directories as needed.
///
/// The table's own delimiter is used unless `delimiter` is given.
pub fn write_table(table: &DataTable, path: impl AsRef<Path>, delimiter: Option<u8>) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| SceneCheckError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter.unwrap_or(table.delimiter))
        .from_path(path)?;

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|e| SceneCheckError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
