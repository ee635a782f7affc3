//! CSV/TSV parser with delimiter detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::source::{DataTable, SourceMetadata};
use crate::error::{Result, SceneCheckError, Stage};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
        }
    }
}

/// Reads annotation exports into a [`DataTable`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| SceneCheckError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| SceneCheckError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let data_table = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let source_metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            data_table.row_count(),
            data_table.column_count(),
        );

        tracing::debug!(
            file = %source_metadata.file,
            rows = source_metadata.row_count,
            columns = source_metadata.column_count,
            format = %source_metadata.format,
            "Parsed annotation table"
        );

        Ok((data_table, source_metadata))
    }

    /// Parse bytes with a known delimiter.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(SceneCheckError::StructuralFailure {
                stage: Stage::Input,
                column: String::new(),
                message: "no header row found".to_string(),
            });
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            row.resize(expected_cols, String::new());
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(SceneCheckError::EmptyData("No data rows found".to_string()));
        }

        Ok(DataTable::new(headers, rows, delimiter))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Rows sampled when detecting the delimiter.
const DETECT_SAMPLE_ROWS: usize = 10;

/// Detect the delimiter from the header and the first rows.
///
/// A candidate must split the header into more than one field, and every
/// sampled row into the same number of fields. Among those the widest
/// header wins; tab wins ties since answers often contain commas.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(SceneCheckError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best: Option<(u8, usize, bool)> = None;
    for &delimiter in DELIMITERS {
        let widths = record_widths(bytes, delimiter);
        let Some(&header) = widths.first() else {
            continue;
        };
        if header < 2 {
            continue;
        }
        let consistent = widths.iter().all(|&w| w == header);
        let better = match best {
            None => true,
            Some((_, width, was_consistent)) => {
                (consistent, header) > (was_consistent, width)
            }
        };
        if better {
            best = Some((delimiter, header, consistent));
        }
    }

    Ok(best.map_or(b',', |(delimiter, _, _)| delimiter))
}

/// Field counts of the first records under a candidate delimiter.
fn record_widths(bytes: &[u8], delimiter: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes)
        .records()
        .take(DETECT_SAMPLE_ROWS + 1)
        .map_while(|record| record.ok())
        .filter(|record| !(record.len() == 1 && record[0].trim().is_empty()))
        .map(|record| record.len())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_prefers_consistent_split() {
        // Commas inside unquoted answers make ',' inconsistent.
        let data = b"Scene;Lanes\ns1;3, No\ns1;2";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
        assert!(detect_delimiter(b"  \n").is_err());
    }

    #[test]
    fn test_quoted_commas_do_not_count() {
        let data = b"Scene,Signs\ns1,\"['a', 'b']\"\ns1,\"[]\"";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
        let table = Parser::new().parse_bytes(data, b',').unwrap();
        assert_eq!(table.get(0, 1), Some("['a', 'b']"));
    }

    #[test]
    fn test_parse_pads_short_rows() {
        let data = b"Scene,Frame,Day\ns1,0\ns1,1,Yes";
        let table = Parser::new().parse_bytes(data, b',').unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, 2), Some(""));
        assert_eq!(table.get(1, 2), Some("Yes"));
    }

    #[test]
    fn test_header_only_is_empty_data() {
        let err = Parser::new().parse_bytes(b"Scene,Day\n", b',').unwrap_err();
        assert!(matches!(err, SceneCheckError::EmptyData(_)));
    }

    #[test]
    fn test_is_null_value() {
        assert!(DataTable::is_null_value(""));
        assert!(DataTable::is_null_value("NA"));
        assert!(DataTable::is_null_value("nan"));
        assert!(DataTable::is_null_value("N/A"));
        assert!(DataTable::is_null_value("null"));
        assert!(DataTable::is_null_value("."));
        assert!(!DataTable::is_null_value("No"));
        assert!(!DataTable::is_null_value("0"));
    }
}
