//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::VeilConfig;
use super::secret::secret_string;
use crate::domain::errors::VeilError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into VeilConfig
/// 4. Applies environment variable overrides (VEIL_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use veil::config::loader::load_config;
///
/// let config = load_config("veil.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<VeilConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(VeilError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        VeilError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
///
/// Same steps as [`load_config`] without the file read.
pub fn parse_config(contents: &str) -> Result<VeilConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: VeilConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        VeilError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| VeilError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(VeilError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using VEIL_* prefix
///
/// Environment variables follow the pattern: VEIL_<SECTION>_<KEY>
/// For example: VEIL_POSTGRESQL_HOST, VEIL_PSEUDONYMIZATION_SALT
fn apply_env_overrides(config: &mut VeilConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("VEIL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("VEIL_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Pseudonymization overrides
    if let Ok(val) = std::env::var("VEIL_PSEUDONYMIZATION_SALT") {
        config.pseudonymization.salt = secret_string(val);
    }
    if let Ok(val) = std::env::var("VEIL_PSEUDONYMIZATION_MAPPING_DIR") {
        config.pseudonymization.mapping_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("VEIL_PSEUDONYMIZATION_REVERSE_INDEX") {
        config.pseudonymization.reverse_index = val.parse().unwrap_or(false);
    }

    // Queue overrides
    if let Ok(val) = std::env::var("VEIL_QUEUE_REGION") {
        config.queue.region = val;
    }
    if let Ok(val) = std::env::var("VEIL_QUEUE_ACCESS_KEY_ID") {
        config.queue.access_key_id = Some(val);
    }
    if let Ok(val) = std::env::var("VEIL_QUEUE_SECRET_ACCESS_KEY") {
        config.queue.secret_access_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("VEIL_QUEUE_DELETE_AFTER_LOAD") {
        config.queue.delete_after_load = val.parse().unwrap_or(false);
    }

    // PostgreSQL overrides
    if let Ok(val) = std::env::var("VEIL_POSTGRESQL_HOST") {
        config.postgresql.host = val;
    }
    if let Ok(val) = std::env::var("VEIL_POSTGRESQL_PORT") {
        if let Ok(port) = val.parse() {
            config.postgresql.port = port;
        }
    }
    if let Ok(val) = std::env::var("VEIL_POSTGRESQL_DATABASE") {
        config.postgresql.database = val;
    }
    if let Ok(val) = std::env::var("VEIL_POSTGRESQL_USERNAME") {
        config.postgresql.username = val;
    }
    if let Ok(val) = std::env::var("VEIL_POSTGRESQL_PASSWORD") {
        config.postgresql.password = secret_string(val);
    }
    if let Ok(val) = std::env::var("VEIL_POSTGRESQL_TABLE") {
        config.postgresql.table = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("VEIL_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("VEIL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
