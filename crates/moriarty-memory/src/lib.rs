//! # moriarty-memory
//!
//! Persistent insight store for the reflection loop.
//!
//! Insights extracted from each cycle are appended to a CSV file with the
//! fixed columns `timestamp, cycle, insight, resource_level, significance`.
//! The store repairs itself: a missing or malformed file is recreated and
//! unreadable rows are skipped. Only storage I/O failures are reported as
//! [`MemoryError`].
//!
//! The store is emptied when the loop terminates.

#![deny(unsafe_code)]

pub mod errors;
pub mod store;

pub use errors::{MemoryError, Result};
pub use store::{InitOutcome, MemoryStore};
