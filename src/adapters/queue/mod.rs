//! Message queue abstraction
//!
//! The pipeline only needs two things from a queue: a bounded, possibly empty
//! batch of messages, and a way to delete the ones it has finished with.

pub mod sqs;

use crate::domain::{QueueError, QueueMessage};
use async_trait::async_trait;

pub use sqs::{queue_url, SqsQueue};

/// Source of raw messages
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Receive up to `max_messages`, waiting at most `wait_time_seconds`
    ///
    /// An empty vector means the queue had nothing to deliver.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::FetchFailed`] if the queue cannot be read.
    async fn fetch_batch(
        &self,
        max_messages: u32,
        wait_time_seconds: u32,
    ) -> Result<Vec<QueueMessage>, QueueError>;

    /// Delete processed messages, returning how many were removed
    ///
    /// Messages without a receipt handle are ignored.
    async fn acknowledge(&self, messages: &[QueueMessage]) -> Result<usize, QueueError>;
}
