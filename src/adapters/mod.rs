//! External system integrations for Veil.
//!
//! - [`queue`] - message source ([`MessageQueue`], SQS implementation)
//! - [`sink`] - record destination ([`RecordSink`], PostgreSQL implementation)
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the pipeline can be
//! exercised with in-memory implementations.
//!
//! ```rust,no_run
//! use veil::adapters::{MessageQueue, SqsQueue};
//! use veil::config::QueueConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = SqsQueue::connect(
//!     &QueueConfig::default(),
//!     "http://localhost:4566/000000000000",
//!     "login-queue",
//! )
//! .await?;
//! let messages = queue.fetch_batch(10, 10).await?;
//! println!("received {}", messages.len());
//! # Ok(())
//! # }
//! ```

pub mod queue;
pub mod sink;

pub use queue::{MessageQueue, SqsQueue};
pub use sink::{PostgresSink, RecordSink};
