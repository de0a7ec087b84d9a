//! Batch pipeline
//!
//! Drives one fetch → transform → persist → flush cycle and reports what
//! happened in a [`BatchSummary`].

pub mod batch;
pub mod summary;

pub use batch::{BatchConfig, BatchPipeline, PipelineState, MAX_MESSAGES_LIMIT, MAX_WAIT_TIME_SECONDS};
pub use summary::{BatchSummary, FailedInsert, SkippedMessage};
