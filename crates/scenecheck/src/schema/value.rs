//! Canonical cell values shared by every stage.

use serde::{Deserialize, Serialize};

use crate::input::DataTable;

/// Canonical binary annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binary {
    Yes,
    No,
}

impl Binary {
    /// Canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Binary::Yes => "Yes",
            Binary::No => "No",
        }
    }

    /// Read an already-normalized cell. Anything but `Yes`/`No` is `None`.
    pub fn from_cell(value: &str) -> Option<Self> {
        match value.trim() {
            "Yes" => Some(Binary::Yes),
            "No" => Some(Binary::No),
            _ => None,
        }
    }
}

impl std::fmt::Display for Binary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a cell holds no usable value.
pub fn is_missing(value: &str) -> bool {
    DataTable::is_null_value(value)
}
