//! # moriarty-agent
//!
//! Reflection loop binary: loads settings, selects a completion backend, and
//! drives the cycle engine until the cycle limit is reached, life runs out,
//! or the process is interrupted.

#![deny(unsafe_code)]

mod provider_factory;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use moriarty_memory::InitOutcome;
use moriarty_runtime::{CycleEngine, CycleLog, CycleReport, EngineState};
use moriarty_settings::{MoriartySettings, ProviderKind};
use tracing::{info, warn};

/// Self-reflection loop driven by life points.
#[derive(Parser, Debug)]
#[command(name = "moriarty-agent", about = "Self-reflection loop driven by life points")]
struct Cli {
    /// Settings file (defaults to `~/.moriarty/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Maximum cycles to run, 0 for no limit.
    #[arg(long)]
    cycles: Option<u64>,

    /// Delay between cycles in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Starting life points.
    #[arg(long)]
    initial_life: Option<i64>,

    /// Memory store CSV path.
    #[arg(long)]
    memory_path: Option<String>,

    /// Ollama model tag.
    #[arg(long)]
    model: Option<String>,

    /// Use the offline stub instead of Ollama.
    #[arg(long)]
    stub: bool,

    /// Seed for the scoring random source.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for per-run cycle logs.
    #[arg(long)]
    log_dir: Option<String>,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    fn apply(&self, settings: &mut MoriartySettings) {
        if let Some(cycles) = self.cycles {
            settings.driver.max_cycles = cycles;
        }
        if let Some(delay) = self.delay_ms {
            settings.driver.cycle_delay_ms = delay;
        }
        if let Some(life) = self.initial_life {
            settings.engine.initial_life = life;
        }
        if let Some(ref path) = self.memory_path {
            settings.memory.path.clone_from(path);
        }
        if let Some(ref model) = self.model {
            settings.model.name.clone_from(model);
        }
        if self.stub {
            settings.model.provider = ProviderKind::Stub;
        }
        if let Some(seed) = self.seed {
            settings.scoring.seed = Some(seed);
        }
        if let Some(ref dir) = self.log_dir {
            settings.driver.log_dir.clone_from(dir);
        }
    }
}

fn load(cli: &Cli) -> Result<MoriartySettings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(moriarty_settings::settings_path);
    let mut settings = moriarty_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    cli.apply(&mut settings);
    settings.validate().context("Invalid settings after command-line overrides")?;
    Ok(settings)
}

fn print_report(report: &CycleReport, streamed: bool) {
    println!();
    if !streamed || report.completion_failed {
        println!("{}", report.response.trim_end());
    }
    println!(
        "--- cycle {} | life {} -> {} / {} (delta {:+}) | insights {} ---",
        report.cycle,
        report.update.previous,
        report.update.current,
        report.maximum,
        report.update.requested,
        report.insights.len()
    );
    for (name, term) in &report.factors {
        println!("    {name}: {term:+}");
    }
    if report.is_terminal() {
        println!("*** TERMINATED: life exhausted, memories erased ***");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load(&cli)?;
    moriarty_core::logging::init_subscriber(settings.logging.level.as_filter_str());

    let streamed = provider_factory::streams_to_stdout(&settings.model);
    let completion = provider_factory::create_completion(&settings.model, streamed)
        .context("Failed to create completion provider")?;
    let mut engine = CycleEngine::from_settings(completion, &settings);

    let store = engine.store();
    match store.initialize().context("Failed to initialize memory store")? {
        InitOutcome::Existing => {}
        InitOutcome::Created => info!(path = %store.path().display(), "memory store created"),
        InitOutcome::Repaired => {
            warn!(path = %store.path().display(), "memory store header was malformed, reset");
        }
    }
    let summary = store.summarize().context("Failed to read memory store")?;
    println!(
        "Memories: {} ({} significant) | life {} / {}",
        summary.total,
        summary.high_significance,
        settings.engine.initial_life,
        settings.engine.max_life
    );

    let mut log = CycleLog::create(Path::new(&settings.driver.log_dir))
        .with_context(|| format!("Failed to create cycle log in {}", settings.driver.log_dir))?;
    info!(path = %log.path().display(), "cycle log opened");

    let max_cycles = settings.driver.max_cycles;
    let delay = Duration::from_millis(settings.driver.cycle_delay_ms);
    let mut state = EngineState::from_settings(&settings.engine);

    loop {
        if max_cycles != 0 && state.cycle >= max_cycles {
            info!(cycles = state.cycle, "cycle limit reached");
            break;
        }

        let report = engine
            .run_cycle(&mut state)
            .await
            .context("Cycle failed; stopping")?;
        if let Err(e) = log.record(&report) {
            warn!(error = %e, path = %log.path().display(), "failed to write cycle log");
        }
        print_report(&report, streamed);

        if report.is_terminal() {
            break;
        }

        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                info!(cycles = state.cycle, "interrupted");
                break;
            }
        }
    }

    let summary = engine
        .store()
        .summarize()
        .context("Failed to read memory store")?;
    println!(
        "\nFinished after {} cycles | life {} / {} | memories {} ({} significant)",
        state.cycle,
        state.resource.current(),
        state.resource.maximum(),
        summary.total,
        summary.high_significance
    );
    Ok(())
}
