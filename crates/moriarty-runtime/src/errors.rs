//! Cycle engine error types.
//!
//! Completion failures never appear here; they are converted to an error
//! marker response and scored. Termination is a normal outcome, so the only
//! termination-related error is asking a terminated engine to run again.

use moriarty_memory::MemoryError;
use thiserror::Error;

/// Fatal cycle engine failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The memory store could not be read or written.
    #[error(transparent)]
    Memory(#[from] MemoryError),

    /// A cycle was requested after the engine terminated.
    #[error("engine terminated at cycle {cycle}; no further cycles can run")]
    Terminated {
        /// Last cycle index reached.
        cycle: u64,
    },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
