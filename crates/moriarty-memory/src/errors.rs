//! Memory store error types.
//!
//! Only storage failures surface here. Missing files, wrong headers, and
//! unparsable rows are repaired or skipped and never become errors.

use thiserror::Error;

/// Fatal memory store failures.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The backing file could not be read, written, or removed.
    #[error("memory store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The CSV layer failed while writing.
    #[error("memory store write failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for memory store operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
