//! Configuration schema types
//!
//! This module defines the configuration structure that maps to `veil.toml`.

use crate::config::SecretString;
use crate::pseudonymization::ReverseLookup;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Main Veil configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VeilConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Pseudonymization settings
    pub pseudonymization: PseudonymizationConfig,

    /// Queue client settings
    #[serde(default)]
    pub queue: QueueConfig,

    /// PostgreSQL sink settings
    pub postgresql: PostgreSQLConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VeilConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.pseudonymization.validate()?;
        self.queue.validate()?;
        self.postgresql.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (transform but don't write rows or mapping files)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Pseudonymization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PseudonymizationConfig {
    /// Salt appended to every value before hashing
    /// Stored securely in memory and automatically zeroized on drop
    pub salt: SecretString,

    /// Directory holding `ip.csv`, `device.csv` and the lock file
    #[serde(default = "default_mapping_dir")]
    pub mapping_dir: PathBuf,

    /// Maintain a pseudonym-to-original index instead of scanning on lookup
    #[serde(default)]
    pub reverse_index: bool,

    /// Locale written when a message has none
    #[serde(default = "default_locale")]
    pub locale_default: String,
}

impl PseudonymizationConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.salt.expose_secret().is_empty() {
            return Err("pseudonymization.salt cannot be empty".to_string());
        }

        if self.mapping_dir.as_os_str().is_empty() {
            return Err("pseudonymization.mapping_dir cannot be empty".to_string());
        }

        if self.locale_default.is_empty() {
            return Err("pseudonymization.locale_default cannot be empty".to_string());
        }

        Ok(())
    }

    /// Reverse lookup mode selected by `reverse_index`
    pub fn reverse_lookup(&self) -> ReverseLookup {
        if self.reverse_index {
            ReverseLookup::Indexed
        } else {
            ReverseLookup::OnDemand
        }
    }
}

/// Queue client configuration
///
/// Endpoint and queue name come from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Region used to sign requests
    #[serde(default = "default_region")]
    pub region: String,

    /// Static access key ID (falls back to the default provider chain)
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Static secret access key
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,

    /// Delete messages from the queue once their rows are persisted
    #[serde(default)]
    pub delete_after_load: bool,
}

impl QueueConfig {
    fn validate(&self) -> Result<(), String> {
        if self.region.is_empty() {
            return Err("queue.region cannot be empty".to_string());
        }

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(
                "queue.access_key_id and queue.secret_access_key must be set together"
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            delete_after_load: false,
        }
    }
}

/// PostgreSQL database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgreSQLConfig {
    /// Database host
    pub host: String,

    /// Database port
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name
    pub database: String,

    /// Database user
    pub username: String,

    /// Database password
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// Target table, optionally schema-qualified
    #[serde(default = "default_pg_table")]
    pub table: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_pg_max_connections")]
    pub max_connections: usize,

    /// Connection timeout in seconds
    #[serde(default = "default_pg_connection_timeout_seconds")]
    pub connection_timeout_seconds: u64,

    /// Statement timeout in seconds
    #[serde(default = "default_pg_statement_timeout_seconds")]
    pub statement_timeout_seconds: u64,
}

impl PostgreSQLConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("postgresql.host cannot be empty".to_string());
        }

        if self.database.is_empty() {
            return Err("postgresql.database cannot be empty".to_string());
        }

        if self.username.is_empty() {
            return Err("postgresql.username cannot be empty".to_string());
        }

        if !table_name_pattern().is_match(&self.table) {
            return Err(format!(
                "postgresql.table '{}' must be an identifier, optionally schema-qualified",
                self.table
            ));
        }

        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(format!(
                "postgresql.max_connections must be between 1 and 100, got {}",
                self.max_connections
            ));
        }

        if self.connection_timeout_seconds == 0 {
            return Err("postgresql.connection_timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

fn table_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("table name pattern is valid")
    })
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_mapping_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_locale() -> String {
    "NA".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_table() -> String {
    "user_logins".to_string()
}

fn default_pg_max_connections() -> usize {
    4
}

fn default_pg_connection_timeout_seconds() -> u64 {
    30
}

fn default_pg_statement_timeout_seconds() -> u64 {
    60
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn pseudonymization() -> PseudonymizationConfig {
        PseudonymizationConfig {
            salt: secret_string("pepper".to_string()),
            mapping_dir: PathBuf::from("mappings"),
            reverse_index: false,
            locale_default: "NA".to_string(),
        }
    }

    fn postgresql() -> PostgreSQLConfig {
        PostgreSQLConfig {
            host: "localhost".to_string(),
            port: 5432,
            database: "veil".to_string(),
            username: "veil".to_string(),
            password: secret_string("secret".to_string()),
            table: "user_logins".to_string(),
            max_connections: 4,
            connection_timeout_seconds: 30,
            statement_timeout_seconds: 60,
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pseudonymization_config_validation() {
        let mut config = pseudonymization();
        assert!(config.validate().is_ok());
        assert_eq!(config.reverse_lookup(), ReverseLookup::OnDemand);

        config.reverse_index = true;
        assert_eq!(config.reverse_lookup(), ReverseLookup::Indexed);

        config.salt = secret_string(String::new());
        assert!(config.validate().unwrap_err().contains("salt"));
    }

    #[test]
    fn test_queue_config_requires_both_keys() {
        let mut config = QueueConfig::default();
        assert!(config.validate().is_ok());

        config.access_key_id = Some("AKIA".to_string());
        assert!(config.validate().is_err());

        config.secret_access_key = Some(secret_string("shh".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgresql_table_name_validation() {
        let mut config = postgresql();
        assert!(config.validate().is_ok());

        config.table = "analytics.user_logins".to_string();
        assert!(config.validate().is_ok());

        config.table = "user_logins; DROP TABLE x".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_postgresql_pool_bounds() {
        let mut config = postgresql();
        config.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_locale(), "NA");
        assert_eq!(default_pg_table(), "user_logins");
        assert_eq!(default_region(), "us-east-1");
        assert_eq!(default_mapping_dir(), PathBuf::from("."));
    }
}
