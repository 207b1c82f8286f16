//! Human-readable per-run cycle log.
//!
//! Each process start opens a new `cycle_log_<YYYYmmdd_HHMMSS>.txt` under the
//! log directory and appends one block per cycle.

use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::engine::CycleReport;

const RULE: &str = "==================================================";

/// Attempts at a unique file name before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Append-only log file for one run.
#[derive(Debug)]
pub struct CycleLog {
    path: PathBuf,
    file: File,
}

impl CycleLog {
    /// Create a fresh log file in `dir`, creating the directory if needed.
    ///
    /// When the timestamped name is taken, `_1`, `_2`, ... are appended.
    pub fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let stem = format!("cycle_log_{}", Utc::now().format("%Y%m%d_%H%M%S"));
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{stem}.txt")
            } else {
                format!("{stem}_{attempt}.txt")
            };
            let path = dir.join(name);
            match OpenOptions::new().append(true).create_new(true).open(&path) {
                Ok(file) => return Ok(Self { path, file }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free cycle log name for {stem} in {}", dir.display()),
        ))
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the block for `report` and flush.
    pub fn record(&mut self, report: &CycleReport) -> io::Result<()> {
        self.file.write_all(render_block(report).as_bytes())?;
        self.file.flush()
    }
}

/// Render one cycle as a log block.
pub fn render_block(report: &CycleReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "Cycle {} | {}",
        report.cycle,
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "Life: {} -> {} / {} (delta {:+})",
        report.update.previous, report.update.current, report.maximum, report.update.requested
    );

    let _ = writeln!(out, "Factors:");
    if report.factors.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (name, term) in &report.factors {
        let _ = writeln!(out, "  {name}: {term:+}");
    }

    let _ = writeln!(out, "Response:");
    let _ = writeln!(out, "{}", report.response.trim_end());

    let _ = writeln!(out, "Insights:");
    if report.insights.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for insight in &report.insights {
        let _ = writeln!(out, "  - {insight}");
    }

    if report.is_terminal() {
        let _ = writeln!(out, "*** TERMINATED: life exhausted, memories erased ***");
    }
    out.push('\n');
    out
}
