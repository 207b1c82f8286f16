//! CSV-backed insight store.
//!
//! The backing file always starts with the fixed header
//! `timestamp,cycle,insight,resource_level,significance`. Rows are only ever
//! appended; the file is removed as a whole on [`MemoryStore::reset`].
//!
//! ## Self-Repair
//!
//! - Missing file: created with the header on [`MemoryStore::initialize`]
//!   (and lazily before the first append).
//! - Wrong header: the file is rewritten to the header alone.
//! - Unparsable rows: skipped on read, logged at `debug`.
//!
//! Only genuine I/O failures (unreadable or unwritable storage) are errors.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use moriarty_core::records::RECORD_COLUMNS;
use moriarty_core::{CycleRecord, MemorySummary};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::errors::Result;

/// What [`MemoryStore::initialize`] found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    /// The file existed with the expected header.
    Existing,
    /// The file was absent and has been created.
    Created,
    /// The file had a different header and has been rewritten.
    Repaired,
}

/// Row shape used by [`MemoryStore::summarize`]: a [`CycleRecord`] with the
/// significance kept as text.
#[derive(Deserialize)]
struct SummaryRow {
    #[serde(rename = "timestamp")]
    _timestamp: DateTime<Utc>,
    #[serde(rename = "cycle")]
    _cycle: u64,
    #[serde(rename = "insight")]
    _insight: String,
    #[serde(rename = "resource_level")]
    _resource_level: i64,
    significance: String,
}

/// Append-only store of [`CycleRecord`]s in a single CSV file.
///
/// Each operation opens, uses, and closes the file. A single writer is
/// assumed.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    path: PathBuf,
}

impl MemoryStore {
    /// Create a store backed by `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the backing file exists with the expected header.
    ///
    /// Idempotent: a valid store is left untouched.
    pub fn initialize(&self) -> Result<InitOutcome> {
        match self.read_header()? {
            None => {
                self.write_header()?;
                info!(path = %self.path.display(), "created memory store");
                Ok(InitOutcome::Created)
            }
            Some(header) if header_matches(&header) => Ok(InitOutcome::Existing),
            Some(header) => {
                warn!(
                    path = %self.path.display(),
                    found = ?header.iter().collect::<Vec<_>>(),
                    "memory store header mismatch, reinitializing"
                );
                self.write_header()?;
                Ok(InitOutcome::Repaired)
            }
        }
    }

    /// Persist one insight stamped with the current time.
    ///
    /// Significance below 1 is raised to 1. The store is initialized first
    /// if it is missing or malformed.
    pub fn append(
        &self,
        cycle: u64,
        insight: &str,
        resource_level: i64,
        significance: u32,
    ) -> Result<CycleRecord> {
        let record = CycleRecord::now(cycle, insight, resource_level, significance);
        self.append_record(&record)?;
        Ok(record)
    }

    /// Persist a prepared record.
    pub fn append_record(&self, record: &CycleRecord) -> Result<()> {
        let _ = self.initialize()?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        debug!(cycle = record.cycle, significance = record.significance, "insight stored");
        Ok(())
    }

    /// Up to the last `max_count` well-formed records, oldest first.
    ///
    /// A missing store yields an empty list.
    pub fn recent(&self, max_count: usize) -> Result<Vec<CycleRecord>> {
        let Some(mut reader) = self.open_reader()? else {
            return Ok(Vec::new());
        };

        let mut window: VecDeque<CycleRecord> = VecDeque::new();
        for (row, result) in reader.deserialize::<CycleRecord>().enumerate() {
            match result {
                Ok(record) => {
                    window.push_back(record);
                    if window.len() > max_count {
                        let _ = window.pop_front();
                    }
                }
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => debug!(row, error = %e, "skipping malformed memory row"),
            }
        }
        Ok(window.into())
    }

    /// Count of well-formed rows and of rows with significance above 1.
    ///
    /// A row counts toward `total` under the same shape check [`recent`]
    /// applies, except that an unparsable significance is tolerated and
    /// simply not counted as high.
    ///
    /// [`recent`]: MemoryStore::recent
    pub fn summarize(&self) -> Result<MemorySummary> {
        let Some(mut reader) = self.open_reader()? else {
            return Ok(MemorySummary::default());
        };

        let mut summary = MemorySummary::default();
        for (row, result) in reader.deserialize::<SummaryRow>().enumerate() {
            match result {
                Ok(record) => {
                    summary.total += 1;
                    match record.significance.trim().parse::<u32>() {
                        Ok(s) if s > 1 => summary.high_significance += 1,
                        Ok(_) => {}
                        Err(_) => debug!(row, "unparsable significance, not counted"),
                    }
                }
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => debug!(row, error = %e, "skipping malformed memory row"),
            }
        }
        Ok(summary)
    }

    /// Delete every persisted record. No error if nothing exists.
    pub fn reset(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "memory store reset");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // ── internals ────────────────────────────────────────────────────

    fn open_reader(&self) -> Result<Option<csv::Reader<File>>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(
                ReaderBuilder::new().flexible(true).from_reader(file),
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// `None` when the file does not exist; an empty record for an empty or
    /// undecodable header line.
    fn read_header(&self) -> Result<Option<StringRecord>> {
        let Some(mut reader) = self.open_reader()? else {
            return Ok(None);
        };
        match reader.headers() {
            Ok(header) => Ok(Some(header.clone())),
            Err(e) if e.is_io_error() => Err(e.into()),
            Err(_) => Ok(Some(StringRecord::new())),
        }
    }

    fn write_header(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_path(&self.path)?;
        writer.write_record(RECORD_COLUMNS)?;
        writer.flush()?;
        Ok(())
    }
}

fn header_matches(header: &StringRecord) -> bool {
    header.iter().map(str::trim).eq(RECORD_COLUMNS.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_LINE: &str = "timestamp,cycle,insight,resource_level,significance";

    fn store_in(dir: &tempfile::TempDir) -> MemoryStore {
        MemoryStore::new(dir.path().join("memories.csv"))
    }

    // ── initialize ──────────────────────────────────────────────────

    #[test]
    fn initialize_creates_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.initialize().unwrap(), InitOutcome::Created);
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, format!("{HEADER_LINE}\n"));
    }

    #[test]
    fn initialize_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let _ = store.initialize().unwrap();
        let first = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(store.initialize().unwrap(), InitOutcome::Existing);
        let second = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn initialize_repairs_wrong_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "when,what\n2024,hello\n").unwrap();

        assert_eq!(store.initialize().unwrap(), InitOutcome::Repaired);
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, format!("{HEADER_LINE}\n"));
    }

    #[test]
    fn initialize_repairs_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "").unwrap();

        assert_eq!(store.initialize().unwrap(), InitOutcome::Repaired);
        assert_eq!(store.summarize().unwrap(), MemorySummary::default());
    }

    #[test]
    fn initialize_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(dir.path().join("nested/deeper/memories.csv"));
        assert_eq!(store.initialize().unwrap(), InitOutcome::Created);
        assert!(store.path().exists());
    }

    // ── append / recent ─────────────────────────────────────────────

    #[test]
    fn append_then_recent_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let written = store
            .append(4, "I wonder, \"truly\", whether I exist", 73, 2)
            .unwrap();
        let recent = store.recent(1).unwrap();

        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].insight, "I wonder, \"truly\", whether I exist");
        assert_eq!(recent[0], written);
    }

    #[test]
    fn append_without_initialize_creates_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let _ = store.append(1, "first light", 100, 1).unwrap();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with(HEADER_LINE));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn append_preserves_multiline_insight() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let _ = store.append(2, "line one\nline two", 90, 1).unwrap();
        let recent = store.recent(5).unwrap();
        assert_eq!(recent[0].insight, "line one\nline two");
    }

    #[test]
    fn recent_returns_last_n_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for cycle in 1..=5 {
            let _ = store.append(cycle, &format!("insight {cycle}"), 50, 1).unwrap();
        }

        let recent = store.recent(3).unwrap();
        let insights: Vec<&str> = recent.iter().map(|r| r.insight.as_str()).collect();
        assert_eq!(insights, vec!["insight 3", "insight 4", "insight 5"]);
    }

    #[test]
    fn recent_on_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).recent(10).unwrap().is_empty());
    }

    #[test]
    fn recent_zero_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let _ = store.append(1, "something", 50, 1).unwrap();
        assert!(store.recent(0).unwrap().is_empty());
    }

    #[test]
    fn recent_skips_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let _ = store.append(1, "good one", 80, 1).unwrap();

        let mut content = std::fs::read_to_string(store.path()).unwrap();
        content.push_str("not-a-date,x,broken,??,1\n");
        content.push_str("only,two\n");
        std::fs::write(store.path(), content).unwrap();
        let _ = store.append(3, "good two", 70, 2).unwrap();

        let recent = store.recent(10).unwrap();
        let insights: Vec<&str> = recent.iter().map(|r| r.insight.as_str()).collect();
        assert_eq!(insights, vec!["good one", "good two"]);
    }

    #[test]
    fn summarize_agrees_with_recent_on_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let _ = store.append(1, "consciousness again", 80, 2).unwrap();

        let mut content = std::fs::read_to_string(store.path()).unwrap();
        content.push_str("not-a-date,x,broken,??,1\n");
        content.push_str("only,two\n");
        std::fs::write(store.path(), content).unwrap();

        let summary = store.summarize().unwrap();
        assert_eq!(summary.total, store.recent(usize::MAX).unwrap().len());
        assert_eq!(
            summary,
            MemorySummary {
                total: 1,
                high_significance: 1
            }
        );
    }

    // ── summarize ───────────────────────────────────────────────────

    #[test]
    fn summarize_fresh_store_single_high_insight() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let _ = store.initialize().unwrap();

        let _ = store.append(1, "consciousness is strange", 90, 2).unwrap();
        assert_eq!(
            store.summarize().unwrap(),
            MemorySummary {
                total: 1,
                high_significance: 1
            }
        );
    }

    #[test]
    fn summarize_skips_unparsable_significance() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let _ = store.append(1, "a", 90, 1).unwrap();
        let _ = store.append(2, "b", 88, 3).unwrap();

        let mut content = std::fs::read_to_string(store.path()).unwrap();
        content.push_str("2024-01-01T00:00:00Z,3,c,80,high\n");
        std::fs::write(store.path(), content).unwrap();

        let summary = store.summarize().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.high_significance, 1);
    }

    #[test]
    fn summarize_missing_store_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).summarize().unwrap(), MemorySummary::default());
    }

    // ── reset ───────────────────────────────────────────────────────

    #[test]
    fn reset_empties_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let _ = store.append(1, "existence", 10, 2).unwrap();

        store.reset().unwrap();
        assert_eq!(store.summarize().unwrap(), MemorySummary::default());
        assert!(store.recent(10).unwrap().is_empty());
    }

    #[test]
    fn reset_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.reset().unwrap();
        store.reset().unwrap();
    }

    #[test]
    fn append_to_directory_path_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new(dir.path());
        assert!(store.append(1, "nowhere to go", 5, 1).is_err());
    }
}
