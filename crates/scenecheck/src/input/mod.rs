//! Input parsing, the in-memory table, and output writing.

mod parser;
mod source;
mod writer;

pub use parser::{Parser, ParserConfig};
pub use source::{DataTable, MISSING, SourceMetadata};
pub use writer::write_table;
