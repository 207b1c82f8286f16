//! Ollama provider implementing [`Completion`].
//!
//! Sends the prompt as the system message of a streaming `/api/chat`
//! request and concatenates the `message.content` of every NDJSON chunk.
//! An optional chunk sink sees each fragment as it arrives, which lets the
//! binary echo the model's thinking live.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::provider::{Completion, ProviderError, ProviderResult};

/// Callback receiving streamed text fragments.
pub type ChunkSink = Arc<dyn Fn(&str) + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Connection and sampling options for an Ollama server.
#[derive(Clone, Debug, PartialEq)]
pub struct OllamaConfig {
    /// Server base URL, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model tag, e.g. `llama3.2:1b`.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling threshold.
    pub top_p: f64,
    /// Maximum generated tokens.
    pub num_predict: u32,
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:1b".to_string(),
            temperature: 1.0,
            top_p: 0.9,
            num_predict: 500,
            timeout_ms: 120_000,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f64,
    top_p: f64,
    num_predict: u32,
}

/// One line of the streamed response.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ChatChunk {
    /// Partial assistant message.
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    /// Set on the final chunk.
    #[serde(default)]
    pub done: bool,
    /// Set when the server aborts the generation.
    #[serde(default)]
    pub error: Option<String>,
}

/// Content fragment of a [`ChatChunk`].
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ChunkMessage {
    /// Text fragment.
    #[serde(default)]
    pub content: String,
}

/// Parse one NDJSON line.
///
/// Blank lines yield `Ok(None)`. A chunk carrying `error` becomes
/// [`ProviderError::Stream`].
pub fn parse_chunk_line(line: &str) -> ProviderResult<Option<ChatChunk>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let chunk: ChatChunk = serde_json::from_str(line)?;
    if let Some(message) = chunk.error {
        return Err(ProviderError::Stream { message });
    }
    Ok(Some(chunk))
}

/// Pull a readable message out of an error response body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming chat client for a local Ollama server.
pub struct OllamaProvider {
    config: OllamaConfig,
    client: reqwest::Client,
    chunk_sink: Option<ChunkSink>,
}

impl OllamaProvider {
    /// Build a provider with its own HTTP client.
    pub fn new(config: OllamaConfig) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            config,
            client,
            chunk_sink: None,
        })
    }

    /// Forward every streamed fragment to `sink`.
    #[must_use]
    pub fn with_chunk_sink(mut self, sink: ChunkSink) -> Self {
        self.chunk_sink = Some(sink);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.base_url.trim_end_matches('/'))
    }

    /// Append the content of one raw line to `text`. Returns `true` on the
    /// final chunk.
    fn consume_line(&self, raw: &[u8], text: &mut String) -> ProviderResult<bool> {
        let line = std::str::from_utf8(raw).map_err(|e| ProviderError::Stream {
            message: format!("invalid UTF-8 in stream: {e}"),
        })?;
        let Some(chunk) = parse_chunk_line(line)? else {
            return Ok(false);
        };
        if let Some(message) = chunk.message {
            if !message.content.is_empty() {
                if let Some(sink) = &self.chunk_sink {
                    sink(&message.content);
                }
                text.push_str(&message.content);
            }
        }
        Ok(chunk.done)
    }
}

impl fmt::Debug for OllamaProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaProvider")
            .field("config", &self.config)
            .field("chunk_sink", &self.chunk_sink.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Completion for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> ProviderResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt,
                },
                ChatMessage {
                    role: "user",
                    content: "",
                },
            ],
            stream: true,
            options: ChatOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                num_predict: self.config.num_predict,
            },
        };

        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending chat request");
        let response = self.client.post(self.chat_url()).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "ollama returned an error status");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();
        let mut text = String::new();
        let mut done = false;

        while !done {
            let Some(bytes) = stream.next().await else {
                break;
            };
            pending.extend_from_slice(&bytes?);
            while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                if self.consume_line(&line, &mut text)? {
                    done = true;
                    break;
                }
            }
        }
        if !done && !pending.is_empty() {
            let _ = self.consume_line(&pending, &mut text)?;
        }

        debug!(response_chars = text.len(), "chat response complete");
        Ok(text)
    }
}
