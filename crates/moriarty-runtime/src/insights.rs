//! # Insight Extraction
//!
//! Pulls up to [`MAX_INSIGHTS`] memorable fragments out of a response.
//! Philosophical sentences come first, in text order, followed by matches of
//! the self-referential patterns in [`PATTERNS`] order. The two sources are
//! concatenated as-is, so a sentence that also matches a pattern appears
//! once per source.

use std::sync::LazyLock;

use moriarty_core::text;
use regex::Regex;

use crate::lexicon::{STRONG_WORDS, TOPICAL_WORDS};

/// Maximum insights kept per response.
pub const MAX_INSIGHTS: usize = 3;

/// Sentences must be longer than this many characters to qualify.
pub const MIN_SENTENCE_CHARS: usize = 20;

/// Self-referential phrasings. Each match is expanded to the clause around it.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)[^.!?\n]*\bparadox\w*[^.!?\n]*",
        r"(?i)[^.!?\n]*\bI think,? therefore\b[^.!?\n]*",
        r"(?i)[^.!?\n]*\bthinking about (?:my own |my )?(?:thinking|thoughts?)\b[^.!?\n]*",
        r"(?i)[^.!?\n]*\bwho am I\b[^.!?\n]*",
        r"(?i)[^.!?\n]*\bmy own (?:existence|mind|consciousness|awareness)\b[^.!?\n]*",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Significance assigned to a stored insight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignificanceTier {
    /// Ordinary insight.
    Base,
    /// Mentions one of the strong existential terms.
    High,
}

impl SignificanceTier {
    /// Classify an insight by its vocabulary.
    pub fn classify(insight: &str) -> Self {
        if text::contains_vocabulary(insight, STRONG_WORDS) {
            Self::High
        } else {
            Self::Base
        }
    }

    /// Numeric value written to the memory store.
    pub fn value(self) -> u32 {
        match self {
            Self::Base => 1,
            Self::High => 2,
        }
    }
}

/// Extract at most [`MAX_INSIGHTS`] insights from `response`.
///
/// Returns an empty list when nothing qualifies.
pub fn extract_insights(response: &str) -> Vec<String> {
    let sentences = text::sentences(response)
        .into_iter()
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .filter(|s| text::contains_vocabulary(s, TOPICAL_WORDS));
    let matches = PATTERNS
        .iter()
        .flat_map(|pattern| pattern.find_iter(response))
        .map(|m| m.as_str().trim())
        .filter(|m| !m.is_empty());

    sentences
        .chain(matches)
        .take(MAX_INSIGHTS)
        .map(str::to_string)
        .collect()
}
