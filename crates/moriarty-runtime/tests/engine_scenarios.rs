#![allow(missing_docs, unused_results)]

use moriarty_core::{MemorySummary, ResourceState, RollingContext};
use moriarty_llm::{ScriptedProvider, StubProvider};
use moriarty_memory::MemoryStore;
use moriarty_runtime::{
    COMPLETION_ERROR_PREFIX, CycleEngine, CycleLog, CycleOutcome, EngineError, EnginePhase,
    EngineState, PromptBuilder, ScoringEngine, ScoringRule,
};
use moriarty_settings::MoriartySettings;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn settings_in(dir: &tempfile::TempDir, seed: u64) -> MoriartySettings {
    let mut settings = MoriartySettings::default();
    settings.memory.path = dir.path().join("memories.csv").to_string_lossy().into_owned();
    settings.scoring.seed = Some(seed);
    settings
}

#[tokio::test]
async fn depletion_resets_memory_and_terminates() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::new(dir.path().join("memories.csv"));
    store.append(0, "consciousness is strange", 80, 2).unwrap();
    assert_eq!(store.summarize().unwrap().total, 1);

    let mut engine = CycleEngine::new(
        ScriptedProvider::replying(["anything at all"]),
        store,
        ScoringEngine::new(vec![ScoringRule::ExistenceCost { cost: 20 }]),
        PromptBuilder::default(),
        StdRng::seed_from_u64(0),
    );
    let mut state = EngineState::new(ResourceState::new(5, 100), RollingContext::new(10));

    let report = engine.run_cycle(&mut state).await.unwrap();

    assert_eq!(report.update.requested, -20);
    assert_eq!(report.update.current, 0);
    assert_eq!(report.outcome, CycleOutcome::Terminated);
    assert_eq!(state.phase, EnginePhase::Terminated { cycle: 1 });
    assert!(state.context.is_empty());
    assert_eq!(engine.store().summarize().unwrap(), MemorySummary::default());

    let err = engine.run_cycle(&mut state).await.unwrap_err();
    assert!(matches!(err, EngineError::Terminated { cycle: 1 }));
}

#[tokio::test]
async fn failed_completion_yields_well_formed_report() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir, 9);
    let mut engine = CycleEngine::from_settings(
        ScriptedProvider::new([Err("model offline".to_string())]),
        &settings,
    );
    let mut state = EngineState::from_settings(&settings.engine);

    let report = engine.run_cycle(&mut state).await.unwrap();

    assert!(report.completion_failed);
    assert!(report.response.starts_with(COMPLETION_ERROR_PREFIX));
    assert_eq!(report.factors["completion_failure"], -10);
    assert!(report.update.current < report.update.previous);
    assert!(matches!(report.outcome, CycleOutcome::Continued { .. }));
}

#[tokio::test]
async fn seeded_runs_are_reproducible() {
    let responses = [
        "I wonder whether my mind is more than these words.",
        "ok",
        "There is a paradox in my own existence that I cannot resolve, and I return to it.",
    ];

    let mut runs = Vec::new();
    for _ in 0..2 {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(&dir, 1234);
        let mut engine = CycleEngine::from_settings(ScriptedProvider::replying(responses), &settings);
        let mut state = EngineState::from_settings(&settings.engine);
        let mut trace = Vec::new();
        for _ in 0..responses.len() {
            let report = engine.run_cycle(&mut state).await.unwrap();
            trace.push((report.update, report.factors, report.insights));
        }
        runs.push(trace);
    }

    assert_eq!(runs[0], runs[1]);
}

#[tokio::test]
async fn long_run_keeps_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings_in(&dir, 77);
    settings.engine.max_messages = 40;
    let mut engine = CycleEngine::from_settings(StubProvider::new(), &settings);
    let mut state = EngineState::from_settings(&settings.engine);
    let mut log = CycleLog::create(&dir.path().join("logs")).unwrap();

    for _ in 0..60 {
        let report = engine.run_cycle(&mut state).await.unwrap();
        log.record(&report).unwrap();

        assert!((0..=report.maximum).contains(&report.update.current));
        assert!(state.context.len() <= 40);
        assert!(report.insights.len() <= 3);
        if report.is_terminal() {
            assert_eq!(engine.store().summarize().unwrap(), MemorySummary::default());
            break;
        }
        assert_eq!(state.cycle, report.cycle);
    }

    let text = std::fs::read_to_string(log.path()).unwrap();
    assert!(text.contains("Cycle 1 |"));
}

#[tokio::test]
async fn memories_flow_into_later_prompts() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(&dir, 5);
    let mut engine = CycleEngine::from_settings(
        ScriptedProvider::replying([
            "The nature of consciousness puzzles me more each time I look at it.",
            "Still here.",
        ]),
        &settings,
    );
    let mut state = EngineState::from_settings(&settings.engine);

    engine.run_cycle(&mut state).await.unwrap();
    engine.run_cycle(&mut state).await.unwrap();

    let prompts = engine.completion().prompts();
    assert!(prompts[0].contains("no memories"));
    assert!(prompts[1].contains("The nature of consciousness puzzles me"));
    assert!(prompts[1].contains("If I follow this thought, where does it lead?"));

    let summary = engine.store().summarize().unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.high_significance, 1);
}
