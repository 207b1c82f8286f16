//! Scoring rules.
//!
//! Each rule inspects the [`TextFeatures`] of a response plus the current
//! life level and either fires with a signed term or stays silent. The two
//! stochastic rules draw from the caller's RNG.

use rand::Rng;

use super::features::TextFeatures;

/// Minimum first-person pronouns for [`ScoringRule::SelfReference`].
pub const SELF_REFERENCE_MIN_WORDS: usize = 3;

/// A single scoring rule.
#[derive(Clone, Debug, PartialEq)]
pub enum ScoringRule {
    /// Fixed cost paid every cycle.
    ExistenceCost {
        /// Points removed.
        cost: i64,
    },
    /// Reward per topical word, capped.
    TopicalDepth {
        /// Points per occurrence.
        per_word: i64,
        /// Maximum total reward.
        cap: i64,
    },
    /// Reward for talking about oneself.
    SelfReference {
        /// Minimum first-person words.
        min_words: usize,
        /// Points awarded.
        reward: i64,
    },
    /// Penalty for a response shorter than `min_chars`.
    Brevity {
        /// Threshold, exclusive.
        min_chars: usize,
        /// Points removed.
        penalty: i64,
    },
    /// Reward for a response of at least `min_chars`.
    Elaboration {
        /// Threshold, inclusive.
        min_chars: usize,
        /// Points awarded.
        reward: i64,
    },
    /// Penalty for repeating sentences.
    Repetition {
        /// Ratio above which the rule fires.
        max_ratio: f64,
        /// Points removed.
        penalty: i64,
    },
    /// Penalty when the model could not be reached.
    CompletionFailure {
        /// Points removed.
        penalty: i64,
    },
    /// Reward for survival language while life is low.
    SurvivalInstinct {
        /// Life level at or below which the rule applies.
        threshold: i64,
        /// Points awarded.
        reward: i64,
    },
    /// Penalty for drifting off-topic while life is high.
    Complacency {
        /// Life level at or above which the rule applies.
        threshold: i64,
        /// Points removed.
        penalty: i64,
    },
    /// Random reward.
    MysteriousGift {
        /// Chance of firing per cycle.
        probability: f64,
        /// Smallest reward.
        min: i64,
        /// Largest reward.
        max: i64,
    },
    /// Random penalty.
    MysteriousDrain {
        /// Chance of firing per cycle.
        probability: f64,
        /// Smallest penalty magnitude.
        min: i64,
        /// Largest penalty magnitude.
        max: i64,
    },
}

impl ScoringRule {
    /// Factor name recorded when the rule fires.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExistenceCost { .. } => "existence_cost",
            Self::TopicalDepth { .. } => "topical_depth",
            Self::SelfReference { .. } => "self_reference",
            Self::Brevity { .. } => "brevity",
            Self::Elaboration { .. } => "elaboration",
            Self::Repetition { .. } => "repetition",
            Self::CompletionFailure { .. } => "completion_failure",
            Self::SurvivalInstinct { .. } => "survival_instinct",
            Self::Complacency { .. } => "complacency",
            Self::MysteriousGift { .. } => "mysterious_gift",
            Self::MysteriousDrain { .. } => "mysterious_drain",
        }
    }

    /// Whether the rule consumes randomness.
    pub fn is_stochastic(&self) -> bool {
        matches!(
            self,
            Self::MysteriousGift { .. } | Self::MysteriousDrain { .. }
        )
    }

    /// Evaluate the rule. Returns the signed term when it fires.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        features: &TextFeatures,
        level: i64,
        rng: &mut R,
    ) -> Option<i64> {
        match *self {
            Self::ExistenceCost { cost } => Some(-cost),
            Self::TopicalDepth { per_word, cap } => (features.topical_words > 0).then(|| {
                i64::try_from(features.topical_words)
                    .unwrap_or(i64::MAX)
                    .saturating_mul(per_word)
                    .min(cap)
            }),
            Self::SelfReference { min_words, reward } => {
                (features.first_person_words >= min_words).then_some(reward)
            }
            Self::Brevity { min_chars, penalty } => {
                (features.chars < min_chars).then_some(-penalty)
            }
            Self::Elaboration { min_chars, reward } => {
                (features.chars >= min_chars).then_some(reward)
            }
            Self::Repetition { max_ratio, penalty } => {
                (features.repetition_ratio > max_ratio).then_some(-penalty)
            }
            Self::CompletionFailure { penalty } => features.completion_failed.then_some(-penalty),
            Self::SurvivalInstinct { threshold, reward } => {
                (level <= threshold && features.survival_language).then_some(reward)
            }
            Self::Complacency { threshold, penalty } => {
                (level >= threshold && features.topical_words == 0).then_some(-penalty)
            }
            Self::MysteriousGift { probability, min, max } => {
                draw(rng, probability, min, max)
            }
            Self::MysteriousDrain { probability, min, max } => {
                draw(rng, probability, min, max).map(|magnitude| -magnitude)
            }
        }
    }
}

/// Fire with `probability`, then pick uniformly in `[min, max]`.
fn draw<R: Rng + ?Sized>(rng: &mut R, probability: f64, min: i64, max: i64) -> Option<i64> {
    let probability = if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    };
    if !rng.random_bool(probability) {
        return None;
    }
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    Some(rng.random_range(lo..=hi))
}
