//! # moriarty-runtime
//!
//! The reflection loop.
//!
//! - [`CycleEngine`]: one prompt, completion, score, and persist step per call
//! - [`ScoringEngine`]: rule table turning a response into a life delta
//! - [`extract_insights`]: memorable fragments of a response
//! - [`PromptBuilder`]: read-only projection of state into the next prompt
//! - [`CycleLog`]: human-readable per-run log

#![deny(unsafe_code)]

pub mod cycle_log;
pub mod engine;
pub mod errors;
pub mod insights;
pub mod lexicon;
pub mod prompt;
pub mod scoring;

pub use cycle_log::{CycleLog, render_block};
pub use engine::{
    COMPLETION_ERROR_PREFIX, CycleEngine, CycleOutcome, CycleReport, EnginePhase, EngineState,
    completion_error_marker,
};
pub use errors::{EngineError, Result};
pub use insights::{MAX_INSIGHTS, SignificanceTier, extract_insights};
pub use prompt::PromptBuilder;
pub use scoring::{ScoreOutcome, ScoringEngine, ScoringRule};
