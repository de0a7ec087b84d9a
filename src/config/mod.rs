//! Configuration management for Veil.
//!
//! Veil reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `VEIL_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! The salt and every credential are supplied here, never compiled in.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [pseudonymization]
//! salt = "${VEIL_SALT}"
//! mapping_dir = "/var/lib/veil"
//!
//! [queue]
//! region = "us-east-1"
//! delete_after_load = false
//!
//! [postgresql]
//! host = "db.internal"
//! database = "analytics"
//! username = "loader"
//! password = "${VEIL_DB_PASSWORD}"
//! table = "user_logins"
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use veil::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("veil.toml")?;
//! println!("Mappings in {}", config.pseudonymization.mapping_dir.display());
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, LoggingConfig, PostgreSQLConfig, PseudonymizationConfig, QueueConfig,
    VeilConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
