//! Domain error types
//!
//! This module defines the error hierarchy for Veil. Errors are split by the
//! stage that produces them so the pipeline can decide whether a failure is
//! fatal to the run or only drops a single message or record.

use crate::domain::category::Category;
use std::path::PathBuf;
use thiserror::Error;

/// Main Veil error type
///
/// This is the primary error type used throughout the application.
/// It wraps the stage-specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum VeilError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Queue-related errors (always fatal to the run)
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Sink-related errors
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Pseudonym store errors
    #[error("Pseudonym store error: {0}")]
    Store(#[from] StoreError),

    /// Per-message transform errors
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),
}

/// Queue errors
///
/// Errors that occur when talking to the message queue. These errors don't
/// expose the SDK's types.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Failed to set up the queue client
    #[error("Failed to connect to queue: {0}")]
    ConnectionFailed(String),

    /// Receiving messages failed
    #[error("Failed to fetch messages: {0}")]
    FetchFailed(String),

    /// Deleting processed messages failed
    #[error("Failed to acknowledge messages: {0}")]
    AcknowledgeFailed(String),
}

/// Sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// A single record could not be written; the batch continues
    #[error("Failed to insert record: {0}")]
    WriteFailed(String),

    /// The connection to the sink is gone; the run must stop
    #[error("Sink connection lost: {0}")]
    ConnectionLost(String),
}

impl SinkError {
    /// Whether the error must terminate the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, SinkError::ConnectionLost(_))
    }
}

/// Pseudonym store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the mapping file failed
    #[error("I/O failure on mapping file {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// The mapping file exists but cannot be trusted
    #[error("Corrupt mapping file {path} at line {line}: {reason}")]
    Corrupt {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// Another process holds the mapping directory lock
    #[error("Mapping directory {path} is locked by another run: {message}")]
    Locked { path: PathBuf, message: String },

    /// More than one original maps to the requested pseudonym
    #[error("Pseudonym {pseudonym} maps to {count} {category} originals")]
    AmbiguousPseudonym {
        category: Category,
        pseudonym: String,
        count: usize,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        StoreError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Per-message transform errors
///
/// A message failing with one of these is dropped and counted; the rest of
/// the batch is still processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The body is not a JSON object
    #[error("Malformed message body: {0}")]
    MalformedBody(String),

    /// A required field is absent, null or empty
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field is present with a JSON type that cannot be used
    #[error("Field {field} has unsupported type {found}")]
    InvalidFieldType { field: String, found: String },

    /// The app version is not a dotted list of numeric components
    #[error("Invalid app version: {0:?}")]
    InvalidVersion(String),
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VeilError {
    fn from(err: toml::de::Error) -> Self {
        VeilError::Configuration(format!("TOML parse error: {err}"))
    }
}
