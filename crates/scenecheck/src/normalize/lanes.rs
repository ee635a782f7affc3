//! Lane-count parsing from free-text model answers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::is_missing;

/// Whole-answer phrases seen in model output, matched case-insensitively
/// before any other parsing.
const LEXICON: &[(&str, i64)] = &[
    ("no", 1),
    ("n/a", 1),
    ("n/a, no", 1),
    ("number of lanes, no", 1),
    ("1 or 2", 2),
    ("2, 3", 2),
    ("yes", 2),
    ("multiple", 2),
    ("multiple lanes", 2),
    ("multiple lanes, no", 2),
    ("1, parking", 2),
];

const NUMBER_WORDS: &[(&str, i64)] = &[
    ("one", 1),
    ("single", 1),
    ("two", 2),
    ("double", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
];

static LEADING_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)(?:\s|,|-|$)").expect("valid lane pattern"));

static LEADING_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([a-z]+)(?:\s|,|-|$)").expect("valid lane word pattern"));

/// Outcome of parsing a lane-count cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneCount {
    /// Parsed lane count.
    Count(i64),
    /// Null-like cell.
    Missing,
    /// Text with no recognizable count.
    Unparseable,
}

/// Parse a lane count. Never fails; unknown text is [`LaneCount::Unparseable`].
pub fn parse_lane_count(raw: &str) -> LaneCount {
    let lower = raw.trim().to_lowercase();

    if let Some((_, count)) = LEXICON.iter().find(|(phrase, _)| *phrase == lower) {
        return LaneCount::Count(*count);
    }
    if is_missing(raw) {
        return LaneCount::Missing;
    }
    if let Ok(number) = lower.parse::<f64>() {
        if number.is_finite() && number >= 0.0 {
            return LaneCount::Count(number.trunc() as i64);
        }
        return LaneCount::Unparseable;
    }
    if let Some(caps) = LEADING_INTEGER.captures(&lower) {
        if let Ok(count) = caps[1].parse::<i64>() {
            return LaneCount::Count(count);
        }
    }
    if let Some(caps) = LEADING_WORD.captures(&lower) {
        if let Some((_, count)) = NUMBER_WORDS.iter().find(|(word, _)| *word == &caps[1]) {
            return LaneCount::Count(*count);
        }
    }

    LaneCount::Unparseable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_passthrough() {
        assert_eq!(parse_lane_count("2"), LaneCount::Count(2));
        assert_eq!(parse_lane_count("3.0"), LaneCount::Count(3));
        assert_eq!(parse_lane_count("1.5"), LaneCount::Count(1));
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(parse_lane_count("2 lanes"), LaneCount::Count(2));
        assert_eq!(parse_lane_count("two-lane"), LaneCount::Count(2));
        assert_eq!(parse_lane_count("Three"), LaneCount::Count(3));
        assert_eq!(parse_lane_count("3, including a motorcycle lane"), LaneCount::Count(3));
        assert_eq!(parse_lane_count("4, No"), LaneCount::Count(4));
        assert_eq!(parse_lane_count("1 lane"), LaneCount::Count(1));
    }

    #[test]
    fn test_lexicon_before_numbers() {
        assert_eq!(parse_lane_count("1 or 2"), LaneCount::Count(2));
        assert_eq!(parse_lane_count("Multiple lanes"), LaneCount::Count(2));
        assert_eq!(parse_lane_count("N/A"), LaneCount::Count(1));
        assert_eq!(parse_lane_count("No"), LaneCount::Count(1));
    }

    #[test]
    fn test_unparseable_and_missing() {
        assert_eq!(parse_lane_count(""), LaneCount::Missing);
        assert_eq!(parse_lane_count("lots of them"), LaneCount::Unparseable);
        assert_eq!(parse_lane_count("-3"), LaneCount::Unparseable);
    }
}
