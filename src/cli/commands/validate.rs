//! Validate config command implementation

use crate::cli::commands::EXIT_CONFIG_ERROR;
use crate::config::{load_config, VeilConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print_summary(&config);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                Ok(EXIT_CONFIG_ERROR)
            }
        }
    }
}

fn print_summary(config: &VeilConfig) {
    let pg = &config.postgresql;

    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!(
        "  Mapping Directory: {}",
        config.pseudonymization.mapping_dir.display()
    );
    println!("  Reverse Index: {}", config.pseudonymization.reverse_index);
    println!("  Default Locale: {}", config.pseudonymization.locale_default);
    println!("  Queue Region: {}", config.queue.region);
    println!(
        "  Queue Credentials: {}",
        if config.queue.access_key_id.is_some() {
            "static"
        } else {
            "default provider chain"
        }
    );
    println!("  Delete After Load: {}", config.queue.delete_after_load);
    println!(
        "  PostgreSQL: {}@{}:{}/{}",
        pg.username, pg.host, pg.port, pg.database
    );
    println!("  Table: {}", pg.table);
    println!("  Max Connections: {}", pg.max_connections);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[pseudonymization]
salt = "pepper"

[postgresql]
host = "localhost"
database = "analytics"
username = "loader"
password = "secret"
"#
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}
            .execute("/nonexistent/veil.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }
}
