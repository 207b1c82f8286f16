//! # moriarty-core
//!
//! Foundation types and utilities shared by every Moriarty crate:
//!
//! - **Records**: [`CycleRecord`], one persisted insight per row of the memory store
//! - **State**: [`ResourceState`] (bounded life points), [`RollingContext`]
//!   (sliding token window), [`FeedbackSnapshot`] (previous cycle's outcome)
//! - **Text**: sentence splitting, whole-word tokenization, repetition ratio
//! - **Logging**: [`logging::init_subscriber`] for the `tracing` stack

#![deny(unsafe_code)]

pub mod logging;
pub mod records;
pub mod state;
pub mod text;

pub use records::{CycleRecord, MemorySummary};
pub use state::{FeedbackSnapshot, ResourceState, ResourceUpdate, RollingContext};
