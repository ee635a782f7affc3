//! Schema types describing the logical fields of an annotation table.

mod field;
mod value;

pub use field::{DomainKind, FieldSpec};
pub use value::{Binary, is_missing};
