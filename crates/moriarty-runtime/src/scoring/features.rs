//! Text features extracted once per response and shared by every rule.

use moriarty_core::text;

use crate::engine::COMPLETION_ERROR_PREFIX;
use crate::lexicon::{FIRST_PERSON_WORDS, SURVIVAL_WORDS, TOPICAL_WORDS};

/// Measurements of a single response.
#[derive(Clone, Debug, PartialEq)]
pub struct TextFeatures {
    /// Character count of the trimmed response.
    pub chars: usize,
    /// Occurrences of topical vocabulary.
    pub topical_words: usize,
    /// Occurrences of first-person pronouns.
    pub first_person_words: usize,
    /// Whether any survival vocabulary appears.
    pub survival_language: bool,
    /// Duplicated-sentence ratio in `[0, 1]`.
    pub repetition_ratio: f64,
    /// Whether the text is the completion error marker.
    pub completion_failed: bool,
}

impl TextFeatures {
    /// Measure `response`.
    pub fn analyze(response: &str) -> Self {
        let trimmed = response.trim();
        Self {
            chars: trimmed.chars().count(),
            topical_words: text::count_vocabulary(trimmed, TOPICAL_WORDS),
            first_person_words: text::count_vocabulary(trimmed, FIRST_PERSON_WORDS),
            survival_language: text::contains_vocabulary(trimmed, SURVIVAL_WORDS),
            repetition_ratio: text::repetition_ratio(trimmed),
            completion_failed: trimmed.starts_with(COMPLETION_ERROR_PREFIX),
        }
    }
}
