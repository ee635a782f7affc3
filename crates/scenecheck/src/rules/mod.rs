//! Rule-based consistency checks.
//!
//! Rules are declared per check group; each group writes one status column
//! holding `OK` or the reason code of the first violated rule.

mod engine;
mod list;
mod spec;
mod status;

pub use engine::{CheckResults, ConsistencyRuleEngine};
pub use list::{list_len, parse_list};
pub use spec::{CheckGroup, RuleKind, RuleSet, RuleSpec, check_column_name};
pub use status::{OK, Severity, StatusCode};
