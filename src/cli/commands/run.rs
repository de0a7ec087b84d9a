//! Run command implementation
//!
//! Fetches one batch from the queue, pseudonymizes it and loads it into
//! PostgreSQL.

use crate::adapters::{PostgresSink, RecordSink, SqsQueue};
use crate::cli::commands::{EXIT_CONFIG_ERROR, EXIT_CONNECTION_ERROR, EXIT_FATAL};
use crate::config::{load_config, PseudonymizationConfig};
use crate::core::pipeline::{BatchConfig, BatchPipeline, BatchSummary};
use crate::core::transform::RecordTransformer;
use crate::domain::StoreError;
use crate::pseudonymization::{MappingLock, Pseudonymizer, StoreSet};
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Queue service endpoint, e.g. http://localhost:4566/000000000000
    #[arg(long, env = "VEIL_ENDPOINT_URL")]
    pub endpoint_url: String,

    /// Queue name appended to the endpoint
    #[arg(long, env = "VEIL_QUEUE_NAME")]
    pub queue_name: String,

    /// Long-poll wait in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(0..=20))]
    pub wait_time: u32,

    /// Maximum messages per batch
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_messages: u32,

    /// Transform only - no database writes, mapping file changes or queue deletes
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let batch_config = BatchConfig::new(self.max_messages, self.wait_time)
            .with_dry_run(config.application.dry_run)
            .with_acknowledge(config.queue.delete_after_load);

        if let Err(e) = batch_config.validate() {
            tracing::error!(error = %e, "Invalid batch settings");
            eprintln!("Configuration error: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let pseudo = &config.pseudonymization;

        // The lock, when taken, is held until the end of the run
        let (_lock, stores) = match load_mappings(pseudo, batch_config.dry_run) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open mapping directory");
                eprintln!("Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        tracing::info!(
            mapping_dir = %pseudo.mapping_dir.display(),
            mappings = stores.total_len(),
            "Mapping files loaded"
        );

        let transformer = RecordTransformer::new(Pseudonymizer::new(pseudo.salt.clone(), stores))
            .with_locale_default(pseudo.locale_default.clone());

        let queue = match SqsQueue::connect(&config.queue, &self.endpoint_url, &self.queue_name).await
        {
            Ok(q) => q,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create queue client");
                eprintln!("Queue connection error: {e}");
                return Ok(EXIT_CONNECTION_ERROR);
            }
        };

        let sink = match PostgresSink::new(config.postgresql.clone()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create database pool");
                eprintln!("Database connection error: {e}");
                return Ok(EXIT_CONNECTION_ERROR);
            }
        };

        if batch_config.dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            println!("DRY RUN MODE - no rows, mapping files or queue deletes will be written");
        } else if let Err(e) = sink.test_connection().await {
            tracing::error!(error = %e, "Database connection test failed");
            eprintln!("Database connection error: {e}");
            return Ok(EXIT_CONNECTION_ERROR);
        }

        let mut pipeline = BatchPipeline::new(queue, sink, transformer, batch_config);

        match pipeline.run_batch().await {
            Ok(summary) => {
                summary.log_summary();
                print_summary(&summary);
                Ok(summary.exit_code())
            }
            Err(e) => {
                tracing::error!(error = %e, state = %pipeline.state(), "Run failed");
                eprintln!("Fatal error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

/// Lock the mapping directory and load its stores
///
/// A dry run never writes mapping files, so it neither locks the directory
/// nor creates missing files.
fn load_mappings(
    pseudo: &PseudonymizationConfig,
    dry_run: bool,
) -> Result<(Option<MappingLock>, StoreSet), StoreError> {
    let mode = pseudo.reverse_lookup();
    if dry_run {
        return Ok((None, StoreSet::load_existing(&pseudo.mapping_dir, mode)?));
    }

    let lock = MappingLock::acquire(&pseudo.mapping_dir)?;
    let stores = StoreSet::load(&pseudo.mapping_dir, mode)?;
    Ok((Some(lock), stores))
}

fn print_summary(summary: &BatchSummary) {
    if summary.is_empty_queue() {
        println!("Queue is empty, nothing to do.");
        return;
    }

    println!("Batch Summary:");
    println!("  Fetched:        {}", summary.fetched);
    println!("  Transformed:    {}", summary.transformed);
    println!("  Skipped:        {}", summary.skipped.len());
    println!("  Persisted:      {}", summary.persisted);
    println!("  Failed inserts: {}", summary.failed_inserts.len());
    println!("  New mappings:   {}", summary.new_mappings);
    if summary.acknowledged > 0 {
        println!("  Acknowledged:   {}", summary.acknowledged);
    }
    println!("  Duration:       {:.2}s", summary.duration.as_secs_f64());
}
