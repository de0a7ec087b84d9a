//! Core business logic for Veil.
//!
//! # Modules
//!
//! - [`transform`] - Message validation, normalization and pseudonymization
//! - [`pipeline`] - Batch orchestration and reporting
//!
//! # Batch Workflow
//!
//! 1. **Fetch**: Receive up to `max_messages` from the queue
//! 2. **Transform**: Turn each message into an output record, skipping bad ones
//! 3. **Persist**: Insert each record into the sink
//! 4. **Flush**: Write changed mapping files to disk
//! 5. **Acknowledge** (optional): Delete persisted messages from the queue
//!
//! # Example
//!
//! ```rust,no_run
//! use veil::adapters::{PostgresSink, SqsQueue};
//! use veil::config::load_config;
//! use veil::core::pipeline::{BatchConfig, BatchPipeline};
//! use veil::core::transform::RecordTransformer;
//! use veil::pseudonymization::{Pseudonymizer, StoreSet};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("veil.toml")?;
//! let pseudo = &config.pseudonymization;
//!
//! let stores = StoreSet::load(&pseudo.mapping_dir, pseudo.reverse_lookup())?;
//! let transformer = RecordTransformer::new(Pseudonymizer::new(pseudo.salt.clone(), stores));
//! let queue = SqsQueue::connect(&config.queue, "http://localhost:4566/000000000000", "logins").await?;
//! let sink = PostgresSink::new(config.postgresql.clone())?;
//!
//! let mut pipeline = BatchPipeline::new(queue, sink, transformer, BatchConfig::default());
//! let summary = pipeline.run_batch().await?;
//! println!("Persisted: {}", summary.persisted);
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod transform;
