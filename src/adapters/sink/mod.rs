//! Record sink abstraction

pub mod postgresql;

use crate::domain::{OutputRecord, SinkError};
use async_trait::async_trait;

pub use postgresql::PostgresSink;

/// Destination for transformed records
///
/// Each insert is its own unit of work: a failed record does not affect the
/// ones before or after it.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Verify the sink is reachable
    async fn test_connection(&self) -> Result<(), SinkError>;

    /// Insert one record
    ///
    /// # Errors
    ///
    /// - [`SinkError::WriteFailed`] if the sink rejected this record
    /// - [`SinkError::ConnectionLost`] if the sink can no longer be reached
    async fn insert(&self, record: &OutputRecord) -> Result<(), SinkError>;
}
