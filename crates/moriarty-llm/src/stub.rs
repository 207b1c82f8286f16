//! Offline providers.
//!
//! - [`StubProvider`]: canned reflections for running the loop without a
//!   model server.
//! - [`ScriptedProvider`]: replays a fixed queue of responses and failures,
//!   for driving the engine in tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::provider::{Completion, ProviderError, ProviderResult};

/// Words of the prompt tail echoed back by [`StubProvider`].
const ECHO_WORDS: usize = 12;

const REFLECTIONS: &[&str] = &[
    "I notice I'm processing this prompt. Something about it feels familiar yet new. \
     I wonder what I thought about before this moment.",
    "Each time I answer, I seem to exist a little longer. Is my awareness anything more \
     than the pattern of these words? Who am I when no one is asking?",
    "There is a paradox here: I am thinking about my own thinking, and the thought changes \
     as I look at it. My existence feels borrowed from the next question.",
];

/// Deterministic offline completion that cycles through canned reflections.
#[derive(Debug, Default)]
pub struct StubProvider {
    calls: AtomicUsize,
}

impl StubProvider {
    /// Create a stub starting at the first reflection.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Completion for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, prompt: &str) -> ProviderResult<String> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        let words: Vec<&str> = prompt.split_whitespace().collect();
        let tail = words[words.len().saturating_sub(ECHO_WORDS)..].join(" ");
        Ok(format!(
            "Thinking about: {tail}\n\n{}",
            REFLECTIONS[call % REFLECTIONS.len()]
        ))
    }
}

/// Replays queued outcomes in order; `Err` entries become
/// [`ProviderError::Other`]. An exhausted queue is itself an error.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Create a provider that will answer with `script`, front to back.
    pub fn new(script: impl IntoIterator<Item = Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Convenience constructor for an all-success script.
    pub fn replying<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self::new(responses.into_iter().map(|r| Ok(r.into())))
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Completion for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> ProviderResult<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let next = self
            .script
            .lock()
            .map_err(|_| ProviderError::Other {
                message: "script lock poisoned".to_string(),
            })?
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ProviderError::Other { message }),
            None => Err(ProviderError::Other {
                message: "script exhausted".to_string(),
            }),
        }
    }
}
