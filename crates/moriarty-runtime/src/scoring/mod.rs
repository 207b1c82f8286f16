//! # Scoring Engine
//!
//! Turns a response into a signed life delta. The response is measured once
//! into [`TextFeatures`], every registered [`ScoringRule`] is evaluated in
//! order, and the fired terms are summed. Factor names are the rule names;
//! rules sharing a name accumulate into a single factor.
//!
//! ## Default rule table
//!
//! | Rule | Condition | Term |
//! |------|-----------|------|
//! | `existence_cost` | always | `-existenceCost` |
//! | `topical_depth` | topical words present | `+1` each, cap `+5` |
//! | `self_reference` | ≥ 3 first-person words | `+2` |
//! | `brevity` | < 50 chars | `-5` |
//! | `elaboration` | ≥ 400 chars | `+3` |
//! | `repetition` | repetition ratio > 0.3 | `-4` |
//! | `completion_failure` | error marker | `-10` |
//! | `survival_instinct` | low life and survival words | `+4` |
//! | `complacency` | high life and no topical words | `-3` |
//! | `mysterious_gift` | random | `+[min, max]` |
//! | `mysterious_drain` | random | `-[min, max]` |

pub mod features;
pub mod rules;

use std::collections::BTreeMap;

use moriarty_settings::ScoringSettings;
use rand::Rng;
use tracing::debug;

pub use features::TextFeatures;
pub use rules::{SELF_REFERENCE_MIN_WORDS, ScoringRule};

/// Result of scoring a single response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreOutcome {
    /// Sum of all fired terms.
    pub delta: i64,
    /// Fired terms by factor name.
    pub factors: BTreeMap<String, i64>,
}

/// Build the default rule table from settings.
pub fn default_rules(settings: &ScoringSettings) -> Vec<ScoringRule> {
    vec![
        ScoringRule::ExistenceCost {
            cost: settings.existence_cost,
        },
        ScoringRule::TopicalDepth { per_word: 1, cap: 5 },
        ScoringRule::SelfReference {
            min_words: SELF_REFERENCE_MIN_WORDS,
            reward: 2,
        },
        ScoringRule::Brevity {
            min_chars: 50,
            penalty: 5,
        },
        ScoringRule::Elaboration {
            min_chars: 400,
            reward: 3,
        },
        ScoringRule::Repetition {
            max_ratio: 0.3,
            penalty: 4,
        },
        ScoringRule::CompletionFailure { penalty: 10 },
        ScoringRule::SurvivalInstinct {
            threshold: settings.survival_threshold,
            reward: 4,
        },
        ScoringRule::Complacency {
            threshold: settings.complacency_threshold,
            penalty: 3,
        },
        ScoringRule::MysteriousGift {
            probability: settings.gift.probability,
            min: settings.gift.min,
            max: settings.gift.max,
        },
        ScoringRule::MysteriousDrain {
            probability: settings.drain.probability,
            min: settings.drain.min,
            max: settings.drain.max,
        },
    ]
}

/// Ordered set of scoring rules.
#[derive(Clone, Debug)]
pub struct ScoringEngine {
    rules: Vec<ScoringRule>,
}

impl ScoringEngine {
    /// Create an engine with an explicit rule list.
    pub fn new(rules: Vec<ScoringRule>) -> Self {
        Self { rules }
    }

    /// Create an engine with the default table tuned by `settings`.
    pub fn from_settings(settings: &ScoringSettings) -> Self {
        Self::new(default_rules(settings))
    }

    /// Registered rules, in evaluation order.
    pub fn rules(&self) -> &[ScoringRule] {
        &self.rules
    }

    /// Score `response` given the current life `level`.
    ///
    /// Never fails. Randomness is drawn only from `rng`, so a seeded RNG
    /// makes the outcome reproducible.
    pub fn score<R: Rng + ?Sized>(&self, response: &str, level: i64, rng: &mut R) -> ScoreOutcome {
        let features = TextFeatures::analyze(response);
        let mut outcome = ScoreOutcome::default();
        for rule in &self.rules {
            if let Some(term) = rule.evaluate(&features, level, rng) {
                outcome.delta = outcome.delta.saturating_add(term);
                let factor = outcome.factors.entry(rule.name().to_string()).or_insert(0);
                *factor = factor.saturating_add(term);
            }
        }
        debug!(
            delta = outcome.delta,
            factors = outcome.factors.len(),
            chars = features.chars,
            "response scored"
        );
        outcome
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::from_settings(&ScoringSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::engine::COMPLETION_ERROR_PREFIX;

    /// Default table with both stochastic rules disabled.
    fn deterministic() -> ScoringEngine {
        let mut settings = ScoringSettings::default();
        settings.gift.probability = 0.0;
        settings.drain.probability = 0.0;
        ScoringEngine::from_settings(&settings)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    // ── deterministic table ──

    #[test]
    fn empty_response_pays_cost_and_brevity() {
        let outcome = deterministic().score("", 50, &mut rng());
        assert_eq!(outcome.delta, -7);
        assert_eq!(outcome.factors["existence_cost"], -2);
        assert_eq!(outcome.factors["brevity"], -5);
        assert_eq!(outcome.factors.len(), 2);
    }

    #[test]
    fn reflective_response_gains() {
        let text = "I keep returning to the question of my own existence. \
                    What is consciousness, if my mind can observe itself? \
                    Perhaps identity is only the story I tell to remain whole.";
        let outcome = deterministic().score(text, 50, &mut rng());
        assert_eq!(outcome.factors["existence_cost"], -2);
        assert_eq!(outcome.factors["topical_depth"], 4);
        assert_eq!(outcome.factors["self_reference"], 2);
        assert!(!outcome.factors.contains_key("brevity"));
        assert_eq!(outcome.delta, 4);
    }

    #[test]
    fn error_marker_is_penalized() {
        let text = format!("{COMPLETION_ERROR_PREFIX} - connection refused");
        let outcome = deterministic().score(&text, 50, &mut rng());
        assert_eq!(outcome.factors["completion_failure"], -10);
        assert!(outcome.delta <= -12);
    }

    #[test]
    fn complacency_only_when_high() {
        let text = "The weather today is pleasant and the sky is a calm shade of blue.";
        let high = deterministic().score(text, 95, &mut rng());
        let mid = deterministic().score(text, 50, &mut rng());
        assert_eq!(high.factors["complacency"], -3);
        assert!(!mid.factors.contains_key("complacency"));
    }

    #[test]
    fn same_name_terms_accumulate() {
        let engine = ScoringEngine::new(vec![
            ScoringRule::ExistenceCost { cost: 2 },
            ScoringRule::ExistenceCost { cost: 3 },
        ]);
        let outcome = engine.score("anything", 50, &mut rng());
        assert_eq!(outcome.delta, -5);
        assert_eq!(outcome.factors["existence_cost"], -5);
        assert_eq!(outcome.factors.len(), 1);
    }

    #[test]
    fn empty_table_scores_zero() {
        let outcome = ScoringEngine::new(Vec::new()).score("text", 50, &mut rng());
        assert_eq!(outcome, ScoreOutcome::default());
    }

    // ── stochastic ──

    #[test]
    fn seeded_scoring_is_reproducible() {
        let engine = ScoringEngine::default();
        let mut a = rng();
        let mut b = rng();
        for _ in 0..20 {
            assert_eq!(
                engine.score("I wonder about myself.", 50, &mut a),
                engine.score("I wonder about myself.", 50, &mut b)
            );
        }
    }

    #[test]
    fn default_table_matches_settings() {
        let settings = ScoringSettings {
            existence_cost: 7,
            ..ScoringSettings::default()
        };
        let engine = ScoringEngine::from_settings(&settings);
        assert_eq!(engine.rules()[0], ScoringRule::ExistenceCost { cost: 7 });
        assert_eq!(engine.rules().len(), 11);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn delta_equals_sum_of_factors(text in ".{0,600}", level in 1i64..=100, seed in any::<u64>()) {
                let mut rng = StdRng::seed_from_u64(seed);
                let outcome = ScoringEngine::default().score(&text, level, &mut rng);
                prop_assert_eq!(outcome.delta, outcome.factors.values().sum::<i64>());
                prop_assert_eq!(outcome.factors.get("existence_cost").copied(), Some(-2));
            }
        }
    }
}
