//! Domain models and types for Veil.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Categories** ([`Category`], [`SensitiveField`]) naming the pseudonym namespaces
//! - **Message models** ([`QueueMessage`], [`RawMessage`], [`OutputRecord`])
//! - **Error types** ([`VeilError`], [`QueueError`], [`SinkError`], [`StoreError`], [`TransformError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Fallible operations return [`Result<T, VeilError>`]. Stage-specific errors
//! convert with `?`:
//!
//! ```rust
//! use veil::domain::{Result, TransformError};
//!
//! fn example() -> Result<()> {
//!     Err::<(), _>(TransformError::MissingField("ip".to_string()))?;
//!     Ok(())
//! }
//! ```

pub mod category;
pub mod errors;
pub mod message;
pub mod result;

// Re-export commonly used types for convenience
pub use category::{Category, SensitiveField};
pub use errors::{QueueError, SinkError, StoreError, TransformError, VeilError};
pub use message::{OutputRecord, QueueMessage, RawMessage};
pub use result::Result;
