//! Text transformations and the canonical analysis arithmetic.
//!
//! Every call site (HTTP handlers, CLI client, tests) goes through these
//! functions; the counting rules are defined exactly once here so client- and
//! server-side numbers can never diverge.
//!
//! ## Analysis rules
//!
//! - words: Unicode-whitespace-separated non-empty segments
//! - characters: all chars that are not whitespace
//! - sentences: segments split on runs of `.` `!` `?` (plus trailing
//!   whitespace) or newlines; non-blank text counts as at least one sentence
//! - read time: `ceil(words / 200)` minutes, minimum 1 when there are words

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Words-per-minute rate for the read-time estimate.
const READ_WPM: usize = 200;

/// The operations exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Uppercase,
    Lowercase,
    Titlecase,
    Reverse,
    Analyze,
}

impl OperationType {
    /// Transforms produce text; `analyze` produces a [`TextAnalysis`].
    pub fn is_transform(self) -> bool {
        !matches!(self, OperationType::Analyze)
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Uppercase => write!(f, "uppercase"),
            OperationType::Lowercase => write!(f, "lowercase"),
            OperationType::Titlecase => write!(f, "titlecase"),
            OperationType::Reverse => write!(f, "reverse"),
            OperationType::Analyze => write!(f, "analyze"),
        }
    }
}

impl FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uppercase" => Ok(OperationType::Uppercase),
            "lowercase" => Ok(OperationType::Lowercase),
            "titlecase" => Ok(OperationType::Titlecase),
            "reverse" => Ok(OperationType::Reverse),
            "analyze" => Ok(OperationType::Analyze),
            _ => Err(format!(
                "Unknown operation '{s}'. Valid operations: uppercase, lowercase, titlecase, reverse, analyze"
            )),
        }
    }
}

/// Structured result of the `analyze` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysis {
    pub word_count: usize,
    pub char_count: usize,
    pub sentence_count: usize,
    /// Estimated read time in whole minutes.
    pub read_time: usize,
}

fn sentence_split() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+\s*|[\r\n]+").expect("sentence split pattern is valid"))
}

pub fn to_uppercase(text: &str) -> String {
    text.to_uppercase()
}

pub fn to_lowercase(text: &str) -> String {
    text.to_lowercase()
}

/// First character of each word uppercased, the rest lowercased. Words are
/// whitespace-separated; runs of whitespace collapse to a single space.
pub fn to_titlecase(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let mut titled: String = first.to_uppercase().collect();
                    titled.extend(chars.flat_map(char::to_lowercase));
                    titled
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Character-wise reversal.
pub fn reverse(text: &str) -> String {
    text.chars().rev().collect()
}

/// The canonical analysis. Empty or whitespace-only text yields all zeros.
pub fn analyze(text: &str) -> TextAnalysis {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return TextAnalysis::default();
    }

    let word_count = trimmed.split_whitespace().count();
    let char_count = text.chars().filter(|c| !c.is_whitespace()).count();

    let sentence_count = sentence_split()
        .split(trimmed)
        .filter(|segment| !segment.trim().is_empty())
        .count()
        .max(1);

    let read_time = word_count.div_ceil(READ_WPM).max(1);

    TextAnalysis {
        word_count,
        char_count,
        sentence_count,
        read_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_type_display_roundtrip() {
        for op in [
            OperationType::Uppercase,
            OperationType::Lowercase,
            OperationType::Titlecase,
            OperationType::Reverse,
            OperationType::Analyze,
        ] {
            assert_eq!(op.to_string().parse::<OperationType>().unwrap(), op);
        }
        assert!("shout".parse::<OperationType>().is_err());
    }

    #[test]
    fn test_operation_type_serde() {
        let json = serde_json::to_string(&OperationType::Titlecase).unwrap();
        assert_eq!(json, "\"titlecase\"");
        let back: OperationType = serde_json::from_str("\"reverse\"").unwrap();
        assert_eq!(back, OperationType::Reverse);
    }

    #[test]
    fn test_uppercase_lowercase() {
        assert_eq!(to_uppercase("hello"), "HELLO");
        assert_eq!(to_lowercase("HeLLo"), "hello");
    }

    #[test]
    fn test_titlecase_basic() {
        assert_eq!(to_titlecase("hello world"), "Hello World");
        assert_eq!(to_titlecase("rUST is FUN"), "Rust Is Fun");
    }

    #[test]
    fn test_titlecase_collapses_whitespace() {
        assert_eq!(to_titlecase("  spaced   out  "), "Spaced Out");
        assert_eq!(to_titlecase(""), "");
    }

    #[test]
    fn test_reverse_unicode() {
        assert_eq!(reverse("hello"), "olleh");
        assert_eq!(reverse("héllo"), "olléh");
        assert_eq!(reverse(""), "");
    }

    #[test]
    fn test_analyze_empty() {
        assert_eq!(analyze(""), TextAnalysis::default());
        assert_eq!(analyze("   \t\n "), TextAnalysis::default());
    }

    #[test]
    fn test_analyze_single_word() {
        let a = analyze("hello");
        assert_eq!(a.word_count, 1);
        assert_eq!(a.char_count, 5);
        assert_eq!(a.sentence_count, 1);
        assert_eq!(a.read_time, 1);
    }

    #[test]
    fn test_analyze_sentences() {
        let a = analyze("One sentence. Two now! Three? And a fragment");
        assert_eq!(a.sentence_count, 4);
        assert_eq!(a.word_count, 8);
    }

    #[test]
    fn test_analyze_newlines_split_sentences() {
        let a = analyze("line one\nline two\r\nline three");
        assert_eq!(a.sentence_count, 3);
    }

    #[test]
    fn test_analyze_char_count_excludes_whitespace() {
        let a = analyze("a b\tc\nd");
        assert_eq!(a.char_count, 4);
    }

    #[test]
    fn test_analyze_read_time_minimum_one() {
        assert_eq!(analyze("just a few words").read_time, 1);
    }

    #[test]
    fn test_analyze_read_time_rounds_up() {
        let text = vec!["word"; 201].join(" ");
        assert_eq!(analyze(&text).read_time, 2);

        let text = vec!["word"; 400].join(" ");
        assert_eq!(analyze(&text).read_time, 2);

        let text = vec!["word"; 401].join(" ");
        assert_eq!(analyze(&text).read_time, 3);
    }

    #[test]
    fn test_analysis_serde_camel_case() {
        let a = analyze("hello world.");
        let json = serde_json::to_value(a).unwrap();
        assert_eq!(json["wordCount"], 2);
        assert_eq!(json["charCount"], 11);
        assert_eq!(json["sentenceCount"], 1);
        assert_eq!(json["readTime"], 1);
    }
}
