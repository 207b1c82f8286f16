//! Completion backend settings.

use serde::{Deserialize, Serialize};

/// Which completion backend to drive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server over HTTP.
    #[default]
    Ollama,
    /// Offline canned reflections.
    Stub,
}

/// Model and sampling options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    /// Backend to use.
    pub provider: ProviderKind,
    /// Model identifier passed to the backend.
    pub name: String,
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling threshold.
    pub top_p: f64,
    /// Maximum tokens generated per response.
    pub num_predict: u32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            name: "llama3.2:1b".to_string(),
            base_url: "http://localhost:11434".to_string(),
            temperature: 1.0,
            top_p: 0.9,
            num_predict: 500,
            timeout_ms: 120_000,
        }
    }
}
