//! Surface-level text analysis shared by scoring, insight extraction, and
//! prompt assembly.
//!
//! Word matching is case-insensitive and whole-word: `"self"` matches
//! `"Self,"` but not `"selfish"`. Hyphenated compounds (`self-awareness`)
//! are a single word.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w']+(?:-[\w']+)*").expect("valid word regex"));

static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// Lowercased words of `text`, in order.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
}

/// Number of words in `text` that appear in `vocabulary`.
///
/// `vocabulary` entries must be lowercase.
pub fn count_vocabulary(text: &str, vocabulary: &[&str]) -> usize {
    words(text)
        .filter(|w| vocabulary.contains(&w.as_str()))
        .count()
}

/// Whether any word of `text` appears in `vocabulary`.
pub fn contains_vocabulary(text: &str, vocabulary: &[&str]) -> bool {
    words(text).any(|w| vocabulary.contains(&w.as_str()))
}

/// Split `text` into sentence-like units on `.`, `!`, and `?`.
///
/// Units are trimmed; empty units are dropped.
pub fn sentences(text: &str) -> Vec<&str> {
    SENTENCE_END_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Fraction of sentences that repeat an earlier sentence.
///
/// Comparison ignores case and inner whitespace. Fewer than two sentences
/// yields `0.0`.
#[allow(clippy::cast_precision_loss)]
pub fn repetition_ratio(text: &str) -> f64 {
    let units = sentences(text);
    if units.len() < 2 {
        return 0.0;
    }
    let unique: HashSet<String> = units
        .iter()
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        .collect();
    1.0 - unique.len() as f64 / units.len() as f64
}

/// Truncate to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
