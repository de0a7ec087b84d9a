//! Batch summary and reporting

use crate::domain::{Category, TransformError};
use std::time::Duration;

/// A message dropped during transformation
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedMessage {
    /// Queue message ID, if the queue assigned one
    pub message_id: Option<String>,

    /// Why the message was dropped
    pub reason: TransformError,
}

/// A record the sink rejected
#[derive(Debug, Clone, PartialEq)]
pub struct FailedInsert {
    /// Queue message ID of the source message
    pub message_id: Option<String>,

    /// Sink error text
    pub error: String,
}

/// Outcome of one batch
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Messages received from the queue
    pub fetched: usize,

    /// Messages turned into records
    pub transformed: usize,

    /// Messages dropped during transformation
    pub skipped: Vec<SkippedMessage>,

    /// Records written to the sink
    pub persisted: usize,

    /// Records the sink rejected
    pub failed_inserts: Vec<FailedInsert>,

    /// Mapping files written at the end of the batch
    pub flushed: Vec<Category>,

    /// Pseudonym pairs created during the batch
    pub new_mappings: usize,

    /// Messages deleted from the queue
    pub acknowledged: usize,

    /// Whether sink writes, flush and acknowledgement were skipped
    pub dry_run: bool,

    /// Wall-clock time of the batch
    pub duration: Duration,
}

impl BatchSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn add_skipped(&mut self, message_id: Option<String>, reason: TransformError) {
        self.skipped.push(SkippedMessage { message_id, reason });
    }

    pub fn add_failed_insert(&mut self, message_id: Option<String>, error: String) {
        self.failed_inserts.push(FailedInsert { message_id, error });
    }

    /// True when the queue delivered nothing
    pub fn is_empty_queue(&self) -> bool {
        self.fetched == 0
    }

    /// True when every fetched message made it through
    pub fn is_successful(&self) -> bool {
        self.skipped.is_empty() && self.failed_inserts.is_empty()
    }

    /// Process exit code for this outcome
    ///
    /// `0` for a clean batch or an empty queue, `1` if anything was skipped
    /// or rejected.
    pub fn exit_code(&self) -> i32 {
        if self.is_empty_queue() || self.is_successful() {
            0
        } else {
            1
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        let flushed = self
            .flushed
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(",");

        tracing::info!(
            fetched = self.fetched,
            transformed = self.transformed,
            skipped = self.skipped.len(),
            persisted = self.persisted,
            failed_inserts = self.failed_inserts.len(),
            new_mappings = self.new_mappings,
            flushed = %flushed,
            acknowledged = self.acknowledged,
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            "Batch completed"
        );

        for skipped in &self.skipped {
            tracing::warn!(
                message_id = skipped.message_id.as_deref().unwrap_or("-"),
                reason = %skipped.reason,
                "Skipped message"
            );
        }

        for failed in &self.failed_inserts {
            tracing::warn!(
                message_id = failed.message_id.as_deref().unwrap_or("-"),
                error = %failed.error,
                "Failed insert"
            );
        }
    }
}
