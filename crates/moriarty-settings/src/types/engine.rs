//! Engine, memory store, and driver settings.

use serde::{Deserialize, Serialize};

/// Default opening thought seeded into the rolling context.
pub const DEFAULT_SEED_THOUGHT: &str = "If I follow this thought, where does it lead?";

/// Cycle engine parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Life points at start.
    pub initial_life: i64,
    /// Upper bound on life points.
    pub max_life: i64,
    /// Rolling context capacity in whitespace-delimited tokens.
    pub max_messages: usize,
    /// Number of stored insights rendered into each prompt.
    pub memory_limit: usize,
    /// Text the rolling context starts with.
    pub seed_thought: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            initial_life: 100,
            max_life: 100,
            max_messages: 100,
            memory_limit: 10,
            seed_thought: DEFAULT_SEED_THOUGHT.to_string(),
        }
    }
}

/// Memory store location.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemorySettings {
    /// Path of the CSV file backing the store.
    pub path: String,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            path: "memories.csv".to_string(),
        }
    }
}

/// Outer loop policy. Not part of the engine contract.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriverSettings {
    /// Cycles to run before stopping; `0` runs until termination.
    pub max_cycles: u64,
    /// Pause between cycles in milliseconds.
    pub cycle_delay_ms: u64,
    /// Directory receiving one cycle log per run.
    pub log_dir: String,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            max_cycles: 20,
            cycle_delay_ms: 1000,
            log_dir: "logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_defaults() {
        let engine = EngineSettings::default();
        assert_eq!(engine.seed_thought, DEFAULT_SEED_THOUGHT);
        assert_eq!(engine.max_life, 100);
    }

    #[test]
    fn driver_zero_cycles_roundtrip() {
        let driver: DriverSettings = serde_json::from_str(r#"{"maxCycles": 0}"#).unwrap();
        assert_eq!(driver.max_cycles, 0);
        assert_eq!(driver.cycle_delay_ms, 1000);
        assert_eq!(driver.log_dir, "logs");
    }
}
