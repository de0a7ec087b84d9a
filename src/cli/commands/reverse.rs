//! Reverse command implementation
//!
//! Prints the original value recorded for a pseudonym. Only values this
//! deployment has pseudonymized can be recovered.

use crate::cli::commands::{EXIT_CONFIG_ERROR, EXIT_FATAL};
use crate::config::{load_config, PseudonymizationConfig};
use crate::domain::{Category, StoreError};
use crate::pseudonymization::{Pseudonymizer, StoreSet};
use clap::Args;

/// Exit code when no original is recorded
pub const EXIT_NOT_FOUND: i32 = 1;

/// Exit code when more than one original shares the pseudonym
pub const EXIT_AMBIGUOUS: i32 = 3;

/// Arguments for the reverse command
#[derive(Args, Debug)]
pub struct ReverseArgs {
    /// Mapping category (ip or device)
    #[arg(long)]
    pub category: Category,

    /// Pseudonym to look up
    pub pseudonym: String,
}

impl ReverseArgs {
    /// Execute the reverse command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let (code, output) = lookup(&config.pseudonymization, self.category, &self.pseudonym);
        match code {
            0 => println!("{output}"),
            _ => eprintln!("{output}"),
        }
        Ok(code)
    }
}

/// Resolve `pseudonym`, returning the exit code and the line to print
fn lookup(config: &PseudonymizationConfig, category: Category, pseudonym: &str) -> (i32, String) {
    let stores = match StoreSet::load_existing(&config.mapping_dir, config.reverse_lookup()) {
        Ok(stores) => stores,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load mapping files");
            return (EXIT_FATAL, format!("Error: {e}"));
        }
    };

    let pseudonymizer = Pseudonymizer::new(config.salt.clone(), stores);
    match pseudonymizer.reverse(pseudonym, category) {
        Ok(Some(original)) => {
            tracing::info!(category = %category, pseudonym = %pseudonym, "Pseudonym resolved");
            (0, original.to_string())
        }
        Ok(None) => (
            EXIT_NOT_FOUND,
            format!("No {category} value recorded for {pseudonym}"),
        ),
        Err(e @ StoreError::AmbiguousPseudonym { .. }) => {
            tracing::warn!(error = %e, "Pseudonym collision");
            (EXIT_AMBIGUOUS, format!("Error: {e}"))
        }
        Err(e) => (EXIT_FATAL, format!("Error: {e}")),
    }
}
