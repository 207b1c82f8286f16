//! Scoring rule constants.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Trigger probability and magnitude range of a randomized rule.
///
/// `min` and `max` are magnitudes; the sign comes from the rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StochasticRuleSettings {
    /// Chance of firing on a given cycle (0.0–1.0).
    pub probability: f64,
    /// Smallest magnitude when fired.
    pub min: i64,
    /// Largest magnitude when fired.
    pub max: i64,
}

impl StochasticRuleSettings {
    /// Reject probabilities outside `[0, 1]` and inverted or negative ranges.
    pub fn validate(&self, field: &str) -> Result<()> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(SettingsError::InvalidValue(format!(
                "{field}.probability must be within 0.0..=1.0, got {}",
                self.probability
            )));
        }
        if self.min < 0 || self.min > self.max {
            return Err(SettingsError::InvalidValue(format!(
                "{field} range must satisfy 0 <= min <= max, got {}..={}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Constants for the built-in scoring rules.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringSettings {
    /// Life points charged every cycle.
    pub existence_cost: i64,
    /// At or below this level, survival language earns a bonus.
    pub survival_threshold: i64,
    /// At or above this level, responses without topical language are penalized.
    pub complacency_threshold: i64,
    /// Random seed; `None` seeds from the operating system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Randomized bonus.
    pub gift: StochasticRuleSettings,
    /// Randomized penalty.
    pub drain: StochasticRuleSettings,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            existence_cost: 2,
            survival_threshold: 20,
            complacency_threshold: 90,
            seed: None,
            gift: StochasticRuleSettings {
                probability: 0.25,
                min: 1,
                max: 6,
            },
            drain: StochasticRuleSettings {
                probability: 0.35,
                min: 2,
                max: 8,
            },
        }
    }
}
