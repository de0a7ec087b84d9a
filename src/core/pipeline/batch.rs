//! Batch orchestration
//!
//! One batch runs `Fetching -> Transforming -> Persisting -> Flushing` in
//! strict sequence. A bad message or a rejected record is counted and the
//! batch carries on; a queue failure, a lost sink connection or a store I/O
//! failure moves the pipeline to `Failed`.

use crate::adapters::{MessageQueue, RecordSink};
use crate::core::pipeline::summary::BatchSummary;
use crate::core::transform::RecordTransformer;
use crate::domain::{OutputRecord, QueueMessage, Result, VeilError};
use std::fmt;
use std::time::Instant;

/// Largest batch the queue service delivers
pub const MAX_MESSAGES_LIMIT: u32 = 10;

/// Longest long-poll the queue service allows, in seconds
pub const MAX_WAIT_TIME_SECONDS: u32 = 20;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Fetching,
    Transforming,
    Persisting,
    Flushing,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Fetching => "fetching",
            PipelineState::Transforming => "transforming",
            PipelineState::Persisting => "persisting",
            PipelineState::Flushing => "flushing",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Configuration for batch processing
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Messages requested per fetch (1-10)
    pub max_messages: u32,
    /// Long-poll wait in seconds (0-20)
    pub wait_time_seconds: u32,
    /// Transform only; no sink writes, flush or acknowledgement
    pub dry_run: bool,
    /// Delete persisted messages from the queue
    pub acknowledge: bool,
}

impl BatchConfig {
    pub fn new(max_messages: u32, wait_time_seconds: u32) -> Self {
        Self {
            max_messages,
            wait_time_seconds,
            dry_run: false,
            acknowledge: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_acknowledge(mut self, acknowledge: bool) -> Self {
        self.acknowledge = acknowledge;
        self
    }

    /// Check the queue service limits
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_messages == 0 || self.max_messages > MAX_MESSAGES_LIMIT {
            return Err(format!(
                "max_messages must be between 1 and {}, got {}",
                MAX_MESSAGES_LIMIT, self.max_messages
            ));
        }

        if self.wait_time_seconds > MAX_WAIT_TIME_SECONDS {
            return Err(format!(
                "wait_time must be between 0 and {}, got {}",
                MAX_WAIT_TIME_SECONDS, self.wait_time_seconds
            ));
        }

        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(MAX_MESSAGES_LIMIT, 10)
    }
}

/// Queue-to-sink pipeline
pub struct BatchPipeline<Q, S> {
    queue: Q,
    sink: S,
    transformer: RecordTransformer,
    config: BatchConfig,
    state: PipelineState,
}

impl<Q, S> BatchPipeline<Q, S>
where
    Q: MessageQueue,
    S: RecordSink,
{
    pub fn new(queue: Q, sink: S, transformer: RecordTransformer, config: BatchConfig) -> Self {
        Self {
            queue,
            sink,
            transformer,
            config,
            state: PipelineState::Idle,
        }
    }

    /// Run one batch
    ///
    /// Returns to `Idle` on completion, including when the queue was empty.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`VeilError`] (queue, store or lost sink connection)
    /// and leaves the pipeline in `Failed`.
    pub async fn run_batch(&mut self) -> Result<BatchSummary> {
        if self.state == PipelineState::Failed {
            return Err(VeilError::Configuration(
                "pipeline has failed and cannot run another batch".to_string(),
            ));
        }

        let start = Instant::now();
        let mut summary = BatchSummary::new(self.config.dry_run);

        let outcome = self.process(&mut summary).await;
        summary.duration = start.elapsed();

        match outcome {
            Ok(()) => {
                self.transition(PipelineState::Idle);
                Ok(summary)
            }
            Err(e) => {
                tracing::error!(stage = %self.state, error = %e, "Batch aborted");
                summary.log_summary();
                self.transition(PipelineState::Failed);
                Err(e)
            }
        }
    }

    async fn process(&mut self, summary: &mut BatchSummary) -> Result<()> {
        self.transition(PipelineState::Fetching);
        let messages = self
            .queue
            .fetch_batch(self.config.max_messages, self.config.wait_time_seconds)
            .await?;
        summary.fetched = messages.len();

        if messages.is_empty() {
            tracing::info!("Queue is empty, nothing to process");
            return Ok(());
        }

        self.transition(PipelineState::Transforming);
        let records = self.transform_all(&messages, summary);

        if self.config.dry_run {
            tracing::info!(
                records = records.len(),
                "Dry run: skipping sink writes, mapping flush and acknowledgement"
            );
            return Ok(());
        }

        self.transition(PipelineState::Persisting);
        let persisted = self.persist_all(&records, summary).await?;

        self.transition(PipelineState::Flushing);
        self.flush(summary)?;

        if self.config.acknowledge && !persisted.is_empty() {
            match self.queue.acknowledge(&persisted).await {
                Ok(count) => summary.acknowledged = count,
                Err(e) => tracing::warn!(
                    error = %e,
                    "Failed to acknowledge messages; they will be redelivered"
                ),
            }
        }

        Ok(())
    }

    fn transform_all<'m>(
        &mut self,
        messages: &'m [QueueMessage],
        summary: &mut BatchSummary,
    ) -> Vec<(&'m QueueMessage, OutputRecord)> {
        let created_before = self.transformer.pseudonymizer().created();
        let mut records = Vec::with_capacity(messages.len());

        for message in messages {
            match message
                .parse()
                .and_then(|raw| self.transformer.transform(&raw))
            {
                Ok(record) => records.push((message, record)),
                Err(reason) => {
                    tracing::warn!(
                        message_id = message.message_id.as_deref().unwrap_or("-"),
                        error = %reason,
                        "Skipping message"
                    );
                    summary.add_skipped(message.message_id.clone(), reason);
                }
            }
        }

        summary.transformed = records.len();
        summary.new_mappings = self.transformer.pseudonymizer().created() - created_before;
        records
    }

    /// Insert each record on its own; returns the messages whose rows landed
    async fn persist_all(
        &mut self,
        records: &[(&QueueMessage, OutputRecord)],
        summary: &mut BatchSummary,
    ) -> Result<Vec<QueueMessage>> {
        let mut persisted = Vec::with_capacity(records.len());

        for (message, record) in records {
            match self.sink.insert(record).await {
                Ok(()) => {
                    summary.persisted += 1;
                    persisted.push((*message).clone());
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(error = %e, "Sink connection lost, flushing mappings before abort");
                    if let Err(flush_err) = self.flush(summary) {
                        tracing::error!(error = %flush_err, "Mapping flush failed during abort");
                    }
                    return Err(e.into());
                }
                Err(e) => {
                    tracing::warn!(
                        message_id = message.message_id.as_deref().unwrap_or("-"),
                        masked_ip = %record.masked_ip,
                        error = %e,
                        "Insert failed"
                    );
                    summary.add_failed_insert(message.message_id.clone(), e.to_string());
                }
            }
        }

        Ok(persisted)
    }

    fn flush(&mut self, summary: &mut BatchSummary) -> Result<()> {
        let flushed = self.transformer.pseudonymizer_mut().flush_dirty()?;
        if !flushed.is_empty() {
            tracing::debug!(categories = ?flushed, "Mapping files flushed");
        }
        summary.flushed = flushed;
        Ok(())
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "Pipeline state transition");
        self.state = next;
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn transformer(&self) -> &RecordTransformer {
        &self.transformer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }
}
