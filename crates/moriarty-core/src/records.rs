//! Persisted memory records.
//!
//! A [`CycleRecord`] is one row of the memory store. Field order matches the
//! fixed column order `timestamp, cycle, insight, resource_level, significance`
//! so the record serializes straight into the tabular backing file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column names of the memory store, in order.
pub const RECORD_COLUMNS: [&str; 5] = [
    "timestamp",
    "cycle",
    "insight",
    "resource_level",
    "significance",
];

/// One insight captured at the end of a cycle.
///
/// Immutable once written; the store never rewrites a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// When the insight was persisted.
    pub timestamp: DateTime<Utc>,
    /// 1-based index of the cycle that produced the insight.
    pub cycle: u64,
    /// The extracted text fragment.
    pub insight: String,
    /// Life points after the cycle's update.
    pub resource_level: i64,
    /// Significance tier, at least 1.
    pub significance: u32,
}

impl CycleRecord {
    /// Create a record stamped with the current time.
    ///
    /// Significance below 1 is raised to 1.
    #[must_use]
    pub fn now(cycle: u64, insight: impl Into<String>, resource_level: i64, significance: u32) -> Self {
        Self {
            timestamp: Utc::now(),
            cycle,
            insight: insight.into(),
            resource_level,
            significance: significance.max(1),
        }
    }

    /// Whether the record is above the base significance tier.
    #[must_use]
    pub fn is_high_significance(&self) -> bool {
        self.significance > 1
    }

    /// Single-line rendering used in prompts and console output.
    #[must_use]
    pub fn one_line(&self) -> String {
        let insight = self.insight.split_whitespace().collect::<Vec<_>>().join(" ");
        format!(
            "[cycle {}, life {}, significance {}] {}",
            self.cycle, self.resource_level, self.significance, insight
        )
    }
}

/// Aggregate view over the memory store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySummary {
    /// Number of data rows in the store.
    pub total: usize,
    /// Rows whose significance parses and is greater than 1.
    pub high_significance: usize,
}
