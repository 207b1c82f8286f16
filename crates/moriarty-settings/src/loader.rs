//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`MoriartySettings::default()`]
//! 2. If `~/.moriarty/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `MORIARTY_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{LogLevel, MoriartySettings, ProviderKind};

/// Resolve the path to the settings file (`~/.moriarty/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".moriarty").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<MoriartySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error. Range checks are left to
/// [`MoriartySettings::validate`] so callers can layer further overrides
/// first.
pub fn load_settings_from_path(path: &Path) -> Result<MoriartySettings> {
    let defaults = serde_json::to_value(MoriartySettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: MoriartySettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_env_overrides(settings: &mut MoriartySettings) {
    // ── Model ───────────────────────────────────────────────────────
    if let Some(v) = read_env_string("MORIARTY_MODEL") {
        settings.model.name = v;
    }
    if let Some(v) = read_env_string("MORIARTY_PROVIDER") {
        match parse_provider(&v) {
            Some(kind) => settings.model.provider = kind,
            None => tracing::warn!(key = "MORIARTY_PROVIDER", value = %v, "unknown provider, ignoring"),
        }
    }
    if let Some(v) = read_env_string("MORIARTY_OLLAMA_URL") {
        settings.model.base_url = v;
    }

    // ── Engine ──────────────────────────────────────────────────────
    if let Some(v) = read_env_i64("MORIARTY_INITIAL_LIFE", 1, 1_000_000) {
        settings.engine.initial_life = v;
    }
    if let Some(v) = read_env_i64("MORIARTY_MAX_LIFE", 1, 1_000_000) {
        settings.engine.max_life = v;
    }
    if let Some(v) = read_env_u64("MORIARTY_MAX_MESSAGES", 0, 100_000) {
        settings.engine.max_messages = usize::try_from(v).unwrap_or(usize::MAX);
    }

    // ── Memory / driver ─────────────────────────────────────────────
    if let Some(v) = read_env_string("MORIARTY_MEMORY_PATH") {
        settings.memory.path = v;
    }
    if let Some(v) = read_env_u64("MORIARTY_MAX_CYCLES", 0, u64::MAX) {
        settings.driver.max_cycles = v;
    }
    if let Some(v) = read_env_u64("MORIARTY_CYCLE_DELAY_MS", 0, 3_600_000) {
        settings.driver.cycle_delay_ms = v;
    }
    if let Some(v) = read_env_string("MORIARTY_LOG_DIR") {
        settings.driver.log_dir = v;
    }

    // ── Scoring / logging ───────────────────────────────────────────
    if let Some(v) = read_env_u64("MORIARTY_SEED", 0, u64::MAX) {
        settings.scoring.seed = Some(v);
    }
    if let Some(v) = read_env_string("MORIARTY_LOG_LEVEL") {
        match parse_log_level(&v) {
            Some(level) => settings.logging.level = level,
            None => tracing::warn!(key = "MORIARTY_LOG_LEVEL", value = %v, "unknown log level, ignoring"),
        }
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a provider name (case-insensitive).
pub fn parse_provider(val: &str) -> Option<ProviderKind> {
    match val.to_lowercase().as_str() {
        "ollama" => Some(ProviderKind::Ollama),
        "stub" | "mock" => Some(ProviderKind::Stub),
        _ => None,
    }
}

/// Parse a log level name (case-insensitive).
pub fn parse_log_level(val: &str) -> Option<LogLevel> {
    match val.to_lowercase().as_str() {
        "trace" => Some(LogLevel::Trace),
        "debug" => Some(LogLevel::Debug),
        "info" => Some(LogLevel::Info),
        "warn" | "warning" => Some(LogLevel::Warn),
        "error" => Some(LogLevel::Error),
        _ => None,
    }
}

/// Parse a string as an `i64` within a range.
pub fn parse_i64_range(val: &str, min: i64, max: i64) -> Option<i64> {
    let n: i64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_i64(name: &str, min: i64, max: i64) -> Option<i64> {
    let val = std::env::var(name).ok()?;
    let result = parse_i64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid i64 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}
