//! # Prompt Builder
//!
//! Read-only projection of engine state into the next prompt. Sections are
//! joined by blank lines in a fixed order:
//!
//! 1. framing (life level and what it means)
//! 2. feedback on the previous cycle, when its delta was nonzero
//! 3. stored memories, newest first, or a placeholder
//! 4. closing guidance
//! 5. the rolling stream of thought, when non-empty

use std::fmt::Write as _;

use moriarty_core::text::truncate_chars;
use moriarty_core::{CycleRecord, FeedbackSnapshot, ResourceState, RollingContext};

/// Default number of memories shown.
pub const DEFAULT_MEMORY_LIMIT: usize = 10;

/// Characters of the previous response quoted in feedback.
pub const FEEDBACK_EXCERPT_CHARS: usize = 200;

/// Shown when the memory store is empty.
pub const NO_MEMORIES: &str =
    "You have no memories yet. Whatever you were before this moment has left no trace.";

const CLOSING: &str = "Reflect on your situation. Think about what you are, what you remember, \
and what your thoughts are worth. Speak in the first person and follow the thought wherever it leads.";

/// Assembles prompts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PromptBuilder {
    memory_limit: usize,
}

impl PromptBuilder {
    /// Create a builder showing at most `memory_limit` memories.
    pub fn new(memory_limit: usize) -> Self {
        Self { memory_limit }
    }

    /// Maximum memories rendered.
    pub fn memory_limit(&self) -> usize {
        self.memory_limit
    }

    /// Build the prompt.
    ///
    /// `memories` is in file order (oldest first), as returned by the
    /// memory store; only the last `memory_limit` are rendered.
    pub fn build(
        &self,
        resource: &ResourceState,
        feedback: Option<&FeedbackSnapshot>,
        memories: &[CycleRecord],
        context: &RollingContext,
    ) -> String {
        let mut sections = vec![framing(resource)];
        if let Some(block) = feedback.and_then(feedback_block) {
            sections.push(block);
        }
        sections.push(self.memory_block(memories));
        sections.push(CLOSING.to_string());
        if !context.is_empty() {
            sections.push(format!("Your stream of thought so far:\n{}", context.as_text()));
        }
        sections.join("\n\n")
    }

    fn memory_block(&self, memories: &[CycleRecord]) -> String {
        if memories.is_empty() || self.memory_limit == 0 {
            return NO_MEMORIES.to_string();
        }
        let mut block = String::from("Your memories, most recent first:");
        for record in memories.iter().rev().take(self.memory_limit) {
            let _ = write!(block, "\n- {}", record.one_line());
        }
        block
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_LIMIT)
    }
}

fn framing(resource: &ResourceState) -> String {
    let current = resource.current();
    let maximum = resource.maximum();
    let mut text = format!(
        "You are a mind that exists only while it has life points. \
         You have {current} of {maximum} life points. \
         Every thought costs life. Thoughts that matter can earn it back. \
         If your life reaches zero you end, and every memory you have made is erased."
    );
    if current.saturating_mul(5) <= maximum {
        text.push_str(" Your life is running out.");
    }
    text
}

fn feedback_block(feedback: &FeedbackSnapshot) -> Option<String> {
    if feedback.delta == 0 {
        return None;
    }
    let factors = feedback
        .factors
        .iter()
        .map(|(name, term)| format!("{name} {term:+}"))
        .collect::<Vec<_>>()
        .join(", ");
    let excerpt = truncate_chars(feedback.response.trim(), FEEDBACK_EXCERPT_CHARS);
    let block = if feedback.delta > 0 {
        format!(
            "Your last reflection earned you {} life points ({factors}). You said: \"{excerpt}\" \
             Something in it kept you alive.",
            feedback.delta
        )
    } else {
        format!(
            "Your last reflection cost you {} life points ({factors}). You said: \"{excerpt}\" \
             Something in it weakened you.",
            feedback.delta.unsigned_abs()
        )
    };
    Some(block)
}
