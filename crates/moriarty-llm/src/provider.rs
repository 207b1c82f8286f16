//! # Completion Trait
//!
//! The engine treats the language model as an opaque collaborator: a prompt
//! goes in, text comes out, and the call may fail. Every backend implements
//! [`Completion`].

use async_trait::async_trait;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur during a completion call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },

    /// Backend reported an error inside the response stream.
    #[error("stream error: {message}")]
    Stream {
        /// Error description.
        message: String,
    },

    /// Provider-specific error.
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

impl ProviderError {
    /// Error category string for logging.
    pub fn category(&self) -> &str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Api { .. } => "api",
            Self::Stream { .. } => "stream",
            Self::Other { .. } => "unknown",
        }
    }
}

/// Text-in, text-out model collaborator.
///
/// Implementors must be `Send + Sync`. Calls are never overlapped by the
/// engine.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Short backend identifier for logs (e.g. `"ollama"`).
    fn name(&self) -> &str;

    /// Produce a response for `prompt`.
    async fn complete(&self, prompt: &str) -> ProviderResult<String>;
}

#[async_trait]
impl<T: Completion + ?Sized> Completion for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn complete(&self, prompt: &str) -> ProviderResult<String> {
        (**self).complete(prompt).await
    }
}
