//! # Cycle Engine
//!
//! Drives one reflection cycle at a time:
//!
//! 1. snapshot the life level
//! 2. build the prompt from state and stored memories
//! 3. ask the completion collaborator, turning failure into an error marker
//! 4. score the response and apply the clamped delta
//! 5. on depletion, erase memories and terminate
//! 6. otherwise store insights, record feedback, and grow the stream of thought
//!
//! The engine owns the memory store, the scorer, and the random source.
//! Mutable run state lives in [`EngineState`] and is passed in by the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use moriarty_core::{FeedbackSnapshot, ResourceState, ResourceUpdate, RollingContext};
use moriarty_llm::{Completion, ProviderError};
use moriarty_memory::MemoryStore;
use moriarty_settings::{EngineSettings, MoriartySettings};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, instrument, warn};

use crate::errors::{EngineError, Result};
use crate::insights::{SignificanceTier, extract_insights};
use crate::prompt::PromptBuilder;
use crate::scoring::ScoringEngine;

/// Leading text of the response substituted for a failed completion.
pub const COMPLETION_ERROR_PREFIX: &str = "Error: Could not complete the reflection";

/// Render the error marker for a failed completion.
pub fn completion_error_marker(error: &ProviderError) -> String {
    format!("{COMPLETION_ERROR_PREFIX} - {error}")
}

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle of an engine run. There is no way back from `Terminated`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnginePhase {
    /// Cycles may run.
    Running,
    /// Life reached zero during `cycle`.
    Terminated {
        /// Cycle in which life ran out.
        cycle: u64,
    },
}

/// Mutable state carried across cycles.
#[derive(Clone, Debug)]
pub struct EngineState {
    /// Life points.
    pub resource: ResourceState,
    /// Rolling stream of thought.
    pub context: RollingContext,
    /// Outcome of the previous completed cycle.
    pub feedback: Option<FeedbackSnapshot>,
    /// Number of cycles completed without terminating.
    pub cycle: u64,
    /// Lifecycle phase.
    pub phase: EnginePhase,
}

impl EngineState {
    /// Fresh running state.
    pub fn new(resource: ResourceState, context: RollingContext) -> Self {
        Self {
            resource,
            context,
            feedback: None,
            cycle: 0,
            phase: EnginePhase::Running,
        }
    }

    /// Fresh state from engine settings, with the stream of thought seeded.
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(
            ResourceState::new(settings.initial_life, settings.max_life),
            RollingContext::seeded(settings.max_messages, &settings.seed_thought),
        )
    }

    /// Whether the run has ended.
    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, EnginePhase::Terminated { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Report
// ─────────────────────────────────────────────────────────────────────────────

/// How a cycle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The run continues.
    Continued {
        /// Life level after the update.
        resource_level: i64,
        /// Insights stored this cycle.
        insight_count: usize,
    },
    /// Life reached zero and memories were erased.
    Terminated,
}

/// Everything observed during one cycle.
#[derive(Clone, Debug)]
pub struct CycleReport {
    /// Cycle number, starting at 1.
    pub cycle: u64,
    /// When the cycle started.
    pub timestamp: DateTime<Utc>,
    /// Prompt sent to the model.
    pub prompt: String,
    /// Response text, or the error marker.
    pub response: String,
    /// Whether `response` is the error marker.
    pub completion_failed: bool,
    /// Life transition.
    pub update: ResourceUpdate,
    /// Maximum life.
    pub maximum: i64,
    /// Fired scoring factors.
    pub factors: BTreeMap<String, i64>,
    /// Insights stored this cycle. Empty on termination.
    pub insights: Vec<String>,
    /// How the cycle ended.
    pub outcome: CycleOutcome,
}

impl CycleReport {
    /// Whether this cycle ended the run.
    pub fn is_terminal(&self) -> bool {
        self.outcome == CycleOutcome::Terminated
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Runs reflection cycles against a completion collaborator.
pub struct CycleEngine<C> {
    completion: C,
    store: MemoryStore,
    scorer: ScoringEngine,
    prompts: PromptBuilder,
    rng: StdRng,
}

impl<C: Completion> CycleEngine<C> {
    /// Assemble an engine from parts.
    pub fn new(
        completion: C,
        store: MemoryStore,
        scorer: ScoringEngine,
        prompts: PromptBuilder,
        rng: StdRng,
    ) -> Self {
        Self {
            completion,
            store,
            scorer,
            prompts,
            rng,
        }
    }

    /// Assemble an engine from settings. Randomness is seeded from
    /// `scoring.seed` when set, otherwise from the OS.
    pub fn from_settings(completion: C, settings: &MoriartySettings) -> Self {
        let rng = match settings.scoring.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(
            completion,
            MemoryStore::new(&settings.memory.path),
            ScoringEngine::from_settings(&settings.scoring),
            PromptBuilder::new(settings.engine.memory_limit),
            rng,
        )
    }

    /// The memory store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// The completion collaborator.
    pub fn completion(&self) -> &C {
        &self.completion
    }

    /// Run one cycle.
    ///
    /// Fails only on storage errors or when `state` is already terminated.
    /// A failed completion is scored like any other response. On a storage
    /// error `state` is left exactly as it was.
    #[instrument(skip_all, fields(cycle = state.cycle + 1))]
    pub async fn run_cycle(&mut self, state: &mut EngineState) -> Result<CycleReport> {
        if let EnginePhase::Terminated { cycle } = state.phase {
            return Err(EngineError::Terminated { cycle });
        }

        let cycle = state.cycle + 1;
        let timestamp = Utc::now();

        let memories = self.store.recent(self.prompts.memory_limit())?;
        let prompt = self.prompts.build(
            &state.resource,
            state.feedback.as_ref(),
            &memories,
            &state.context,
        );

        let (response, completion_failed) = match self.completion.complete(&prompt).await {
            Ok(text) => (text, false),
            Err(e) => {
                warn!(
                    provider = self.completion.name(),
                    category = e.category(),
                    error = %e,
                    "completion failed, scoring error marker"
                );
                (completion_error_marker(&e), true)
            }
        };

        let score = self
            .scorer
            .score(&response, state.resource.current(), &mut self.rng);
        let mut resource = state.resource;
        let update = resource.apply(score.delta);

        if resource.is_depleted() {
            self.store.reset()?;
            state.resource = resource;
            state.phase = EnginePhase::Terminated { cycle };
            info!(
                delta = score.delta,
                level = update.current,
                "life exhausted, memories erased"
            );
            return Ok(CycleReport {
                cycle,
                timestamp,
                prompt,
                response,
                completion_failed,
                update,
                maximum: resource.maximum(),
                factors: score.factors,
                insights: Vec::new(),
                outcome: CycleOutcome::Terminated,
            });
        }

        let insights = extract_insights(&response);
        for insight in &insights {
            let tier = SignificanceTier::classify(insight);
            let _ = self
                .store
                .append(cycle, insight, update.current, tier.value())?;
        }

        // Storage is done; nothing below can fail.
        state.resource = resource;
        state.feedback = Some(FeedbackSnapshot {
            delta: score.delta,
            factors: score.factors.clone(),
            response: response.clone(),
        });
        state.context.append(&response);
        state.cycle = cycle;

        info!(
            delta = score.delta,
            level = update.current,
            insights = insights.len(),
            "cycle complete"
        );

        Ok(CycleReport {
            cycle,
            timestamp,
            prompt,
            response,
            completion_failed,
            update,
            maximum: state.resource.maximum(),
            factors: score.factors,
            outcome: CycleOutcome::Continued {
                resource_level: update.current,
                insight_count: insights.len(),
            },
            insights,
        })
    }
}
