//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and implement
//! [`Default`] with production values. Every section is marked
//! `#[serde(default)]`, so a partial JSON file only overrides what it names.

mod engine;
mod model;
mod scoring;

pub use engine::*;
pub use model::*;
pub use scoring::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type for the reflection loop.
///
/// # JSON Format
///
/// ```json
/// {
///   "model": { "name": "llama3.2:1b" },
///   "engine": { "initialLife": 60 },
///   "driver": { "maxCycles": 0 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoriartySettings {
    /// Completion backend selection and sampling options.
    pub model: ModelSettings,
    /// Cycle engine parameters.
    pub engine: EngineSettings,
    /// Memory store location.
    pub memory: MemorySettings,
    /// Scoring rule constants.
    pub scoring: ScoringSettings,
    /// Outer loop policy.
    pub driver: DriverSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl MoriartySettings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let engine = &self.engine;
        if engine.max_life < 1 {
            return Err(SettingsError::InvalidValue(format!(
                "engine.maxLife must be at least 1, got {}",
                engine.max_life
            )));
        }
        if engine.initial_life < 1 || engine.initial_life > engine.max_life {
            return Err(SettingsError::InvalidValue(format!(
                "engine.initialLife must be within 1..={}, got {}",
                engine.max_life, engine.initial_life
            )));
        }
        if engine.memory_limit == 0 {
            return Err(SettingsError::InvalidValue(
                "engine.memoryLimit must be at least 1".to_string(),
            ));
        }
        self.scoring.gift.validate("scoring.gift")?;
        self.scoring.drain.validate("scoring.drain")?;
        Ok(())
    }
}

/// Log verbosity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose.
    Trace,
    /// Diagnostic detail, including skipped store rows.
    Debug,
    /// One line per cycle.
    #[default]
    Info,
    /// Recoverable problems only.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level written to stderr.
    pub level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = MoriartySettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.model.name, "llama3.2:1b");
        assert_eq!(settings.engine.initial_life, 100);
        assert_eq!(settings.engine.max_messages, 100);
        assert_eq!(settings.engine.memory_limit, 10);
        assert_eq!(settings.driver.max_cycles, 20);
        assert_eq!(settings.logging.level, LogLevel::Info);
    }

    #[test]
    fn initial_life_above_max_rejected() {
        let mut settings = MoriartySettings::default();
        settings.engine.initial_life = 150;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("initialLife"));
    }

    #[test]
    fn zero_max_life_rejected() {
        let mut settings = MoriartySettings::default();
        settings.engine.max_life = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_memory_limit_rejected() {
        let mut settings = MoriartySettings::default();
        settings.engine.memory_limit = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn bad_probability_rejected() {
        let mut settings = MoriartySettings::default();
        settings.scoring.drain.probability = 1.5;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("scoring.drain"));
    }

    #[test]
    fn log_level_serde_lowercase() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(MoriartySettings::default()).unwrap();
        assert!(json["engine"].get("initialLife").is_some());
        assert!(json["driver"].get("cycleDelayMs").is_some());
    }
}
