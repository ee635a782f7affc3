//! Parsing of stringified list cells.
//!
//! Model output stores lists in several spellings: JSON arrays, bracketed
//! literals with single quotes, or bare comma-separated text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::is_missing;

/// One quoted item inside a bracketed literal.
static QUOTED_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")\s*(?:,|$)"#)
        .expect("valid list item pattern")
});

/// Parse a list cell. A missing cell is an empty list; `None` means the
/// cell is bracketed but malformed.
pub fn parse_list(raw: &str) -> Option<Vec<String>> {
    if is_missing(raw) {
        return Some(Vec::new());
    }
    let text = raw.trim();

    if !text.starts_with('[') {
        return Some(
            text.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        );
    }

    if let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(text) {
        return Some(
            items
                .into_iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        );
    }

    parse_quoted_literal(text)
}

fn parse_quoted_literal(text: &str) -> Option<Vec<String>> {
    let mut rest = text.strip_prefix('[')?.strip_suffix(']')?.trim();
    let mut items = Vec::new();
    while !rest.is_empty() {
        let caps = QUOTED_ITEM.captures(rest)?;
        let item = caps.get(1).or_else(|| caps.get(2))?;
        items.push(item.as_str().to_string());
        let consumed = caps.get(0)?.end();
        rest = rest[consumed..].trim_start();
    }
    Some(items)
}

/// Length of a list cell, `None` when unparseable.
pub fn list_len(raw: &str) -> Option<usize> {
    parse_list(raw).map(|items| items.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_array() {
        assert_eq!(list_len(r#"["Stop", "Yield"]"#), Some(2));
        assert_eq!(list_len("[]"), Some(0));
    }

    #[test]
    fn test_single_quoted_literal() {
        assert_eq!(
            parse_list("['Speed limit 30', 'No entry']"),
            Some(vec!["Speed limit 30".to_string(), "No entry".to_string()])
        );
        assert_eq!(list_len("['Mon-Fri, 8-18']"), Some(1));
    }

    #[test]
    fn test_comma_separated() {
        assert_eq!(list_len("Stop, Yield, Parking"), Some(3));
        assert_eq!(list_len("Stop"), Some(1));
    }

    #[test]
    fn test_missing_is_empty() {
        assert_eq!(list_len(""), Some(0));
        assert_eq!(list_len("NA"), Some(0));
    }

    #[test]
    fn test_malformed_bracket() {
        assert_eq!(list_len("['Stop', Yield]"), None);
        assert_eq!(list_len("['Stop'"), None);
    }
}
