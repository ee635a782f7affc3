//! In-memory annotation table and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel written into a cell whose value is missing or could not be coerced.
pub const MISSING: &str = "";

/// Metadata about the file an annotation table was read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            read_at: Utc::now(),
        }
    }
}

/// Per-frame annotation rows as strings, one row per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order). Every row has `headers.len()` cells.
    pub rows: Vec<Vec<String>>,
    /// The delimiter used.
    pub delimiter: u8,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        Self {
            headers,
            rows,
            delimiter,
        }
    }

    /// Build a comma-delimited table from string slices; convenient for tests.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        let width = headers.len();
        let rows = rows
            .iter()
            .map(|r| {
                let mut row: Vec<String> = r.iter().map(|s| s.to_string()).collect();
                row.resize(width, String::new());
                row
            })
            .collect();
        Self::new(headers.iter().map(|h| h.to_string()).collect(), rows, b',')
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Whether a column with this header exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Overwrite a cell, returning true when the stored value changed.
    pub fn set(&mut self, row: usize, col: usize, value: &str) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) if cell != value => {
                *cell = value.to_string();
                true
            }
            _ => false,
        }
    }

    /// Append a column at the end of every row.
    ///
    /// `values` must contain one entry per row; shorter input is padded with
    /// [`MISSING`].
    pub fn push_column(&mut self, header: impl Into<String>, values: Vec<String>) {
        self.headers.push(header.into());
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.push(values.next().unwrap_or_else(|| MISSING.to_string()));
        }
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reports_change() {
        let mut table = DataTable::from_rows(&["a"], &[&["Yes"]]);
        assert!(!table.set(0, 0, "Yes"));
        assert!(table.set(0, 0, "No"));
        assert_eq!(table.get(0, 0), Some("No"));
        assert!(!table.set(5, 0, "No"));
    }

    #[test]
    fn test_push_column_pads() {
        let mut table = DataTable::from_rows(&["a"], &[&["1"], &["2"]]);
        table.push_column("a_check", vec!["OK".to_string()]);
        assert_eq!(table.headers, vec!["a", "a_check"]);
        assert_eq!(table.get(0, 1), Some("OK"));
        assert_eq!(table.get(1, 1), Some(MISSING));
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = DataTable::from_rows(&["a", "b"], &[&["1"]]);
        assert_eq!(table.rows[0], vec!["1".to_string(), String::new()]);
    }
}
