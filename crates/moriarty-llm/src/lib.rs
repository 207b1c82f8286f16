//! # moriarty-llm
//!
//! The completion collaborator of the reflection loop.
//!
//! - [`Completion`]: text prompt in, text response out, may fail
//! - [`OllamaProvider`]: streaming client for a local Ollama server
//! - [`StubProvider`] / [`ScriptedProvider`]: offline implementations

#![deny(unsafe_code)]

pub mod ollama;
pub mod provider;
pub mod stub;

pub use ollama::{ChunkSink, OllamaConfig, OllamaProvider};
pub use provider::{Completion, ProviderError, ProviderResult};
pub use stub::{ScriptedProvider, StubProvider};
