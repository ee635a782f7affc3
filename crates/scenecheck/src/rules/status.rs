//! Per-row status codes written into check columns.

use serde::{Deserialize, Serialize};

/// Text written for a row with no violation.
pub const OK: &str = "OK";

/// How strongly a violation should be treated by the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suspicious but possibly legitimate.
    Advisory,
    /// Logically inconsistent annotation.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Advisory => "Advisory",
            Severity::Error => "Error",
        }
    }
}

/// Status of one row in one check group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusCode {
    #[default]
    Ok,
    Violation { reason: String, severity: Severity },
}

impl StatusCode {
    /// An error-severity violation.
    pub fn error(reason: impl Into<String>) -> Self {
        StatusCode::Violation {
            reason: reason.into(),
            severity: Severity::Error,
        }
    }

    /// An advisory violation.
    pub fn advisory(reason: impl Into<String>) -> Self {
        StatusCode::Violation {
            reason: reason.into(),
            severity: Severity::Advisory,
        }
    }

    /// Whether the row passed.
    pub fn is_ok(&self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    /// Text for the check column.
    pub fn as_str(&self) -> &str {
        match self {
            StatusCode::Ok => OK,
            StatusCode::Violation { reason, .. } => reason,
        }
    }

    /// Severity of a violation.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            StatusCode::Ok => None,
            StatusCode::Violation { severity, .. } => Some(*severity),
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
