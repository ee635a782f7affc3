//! Canonicalization of noisy Yes/No annotations.

use crate::schema::{Binary, is_missing};

/// Words that make an answer non-committal.
const HEDGES: &[&str] = &[
    "possible", "possibly", "maybe", "unclear", "uncertain", "unknown", "likely", "probably",
    "perhaps",
];

/// Outcome of canonicalizing one binary cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryValue {
    /// A canonical value.
    Value(Binary),
    /// Null-like cell, left untouched.
    Missing,
    /// Text with no recognizable answer; written as `No`.
    Unmapped,
}

/// Canonicalize a raw binary annotation.
///
/// Precedence: exact answers, then a leading `yes` without any negation
/// (`Yes (partial)`, `Yes, mostly`), then contradictory or hedged text
/// (both become `No`), then boolean spellings and a leading `no`.
pub fn canonicalize_binary(raw: &str) -> BinaryValue {
    if is_missing(raw) {
        return BinaryValue::Missing;
    }

    let lower = raw.trim().to_lowercase();
    match lower.as_str() {
        "yes" => return BinaryValue::Value(Binary::Yes),
        "no" => return BinaryValue::Value(Binary::No),
        _ => {}
    }

    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    let has = |word: &str| tokens.iter().any(|t| *t == word);
    let negated = has("no") || has("not");

    if tokens.first() == Some(&"yes") && !negated {
        return BinaryValue::Value(Binary::Yes);
    }
    if has("yes") && negated {
        return BinaryValue::Value(Binary::No);
    }
    if tokens.iter().any(|t| HEDGES.contains(t)) {
        return BinaryValue::Value(Binary::No);
    }

    match lower.as_str() {
        "true" | "t" | "y" | "1" => BinaryValue::Value(Binary::Yes),
        "false" | "f" | "n" | "0" => BinaryValue::Value(Binary::No),
        _ if tokens.first() == Some(&"no") => BinaryValue::Value(Binary::No),
        _ => BinaryValue::Unmapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(raw: &str) -> BinaryValue {
        canonicalize_binary(raw)
    }

    const YES: BinaryValue = BinaryValue::Value(Binary::Yes);
    const NO: BinaryValue = BinaryValue::Value(Binary::No);

    #[test]
    fn test_exact_values() {
        assert_eq!(value("Yes"), YES);
        assert_eq!(value(" no "), NO);
    }

    #[test]
    fn test_qualified_positive_wins() {
        assert_eq!(value("Yes (partial)"), YES);
        assert_eq!(value("Yes, mostly"), YES);
        assert_eq!(value("yes - maybe faded"), YES);
    }

    #[test]
    fn test_contradiction_is_no() {
        assert_eq!(value("Yes, No"), NO);
        assert_eq!(value("No / Yes"), NO);
        assert_eq!(value("yes, not visible"), NO);
    }

    #[test]
    fn test_hedged_is_no() {
        assert_eq!(value("Possible"), NO);
        assert_eq!(value("Maybe"), NO);
        assert_eq!(value("Unclear"), NO);
    }

    #[test]
    fn test_boolean_spellings() {
        assert_eq!(value("TRUE"), YES);
        assert_eq!(value("0"), NO);
        assert_eq!(value("No (none visible)"), NO);
    }

    #[test]
    fn test_missing_and_unmapped() {
        assert_eq!(value(""), BinaryValue::Missing);
        assert_eq!(value("NA"), BinaryValue::Missing);
        assert_eq!(value("Gravel"), BinaryValue::Unmapped);
    }
}
