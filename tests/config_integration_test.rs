//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX`.

use secrecy::ExposeSecret;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;
use veil::config::load_config;
use veil::pseudonymization::ReverseLookup;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    std::env::remove_var("VEIL_APPLICATION_DRY_RUN");
    std::env::remove_var("VEIL_PSEUDONYMIZATION_SALT");
    std::env::remove_var("VEIL_POSTGRESQL_HOST");
    std::env::remove_var("VEIL_QUEUE_DELETE_AFTER_LOAD");
    std::env::remove_var("TEST_VEIL_DB_PASSWORD");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const COMPLETE: &str = r#"
[application]
log_level = "debug"
dry_run = false

[pseudonymization]
salt = "pepper"
mapping_dir = "/var/lib/veil"
reverse_index = true
locale_default = "ZZ"

[queue]
region = "eu-west-1"
access_key_id = "AKIDEXAMPLE"
secret_access_key = "wJalrXUtnFEMI"
delete_after_load = true

[postgresql]
host = "db.internal"
port = 6432
database = "analytics"
username = "loader"
password = "${TEST_VEIL_DB_PASSWORD}"
table = "public.user_logins"
max_connections = 8

[logging]
local_enabled = true
local_path = "/var/log/veil"
local_rotation = "hourly"
"#;

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_VEIL_DB_PASSWORD", "from-env");

    let file = write_config(COMPLETE);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.pseudonymization.salt.expose_secret().as_ref(), "pepper");
    assert_eq!(
        config.pseudonymization.mapping_dir,
        PathBuf::from("/var/lib/veil")
    );
    assert_eq!(
        config.pseudonymization.reverse_lookup(),
        ReverseLookup::Indexed
    );
    assert_eq!(config.pseudonymization.locale_default, "ZZ");
    assert_eq!(config.queue.region, "eu-west-1");
    assert!(config.queue.delete_after_load);
    assert_eq!(config.postgresql.port, 6432);
    assert_eq!(
        config.postgresql.password.expose_secret().as_ref(),
        "from-env"
    );
    assert_eq!(config.postgresql.table, "public.user_logins");
    assert_eq!(config.logging.local_rotation, "hourly");

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(COMPLETE);
    let err = load_config(file.path()).unwrap_err();

    assert!(err.to_string().contains("TEST_VEIL_DB_PASSWORD"));
}

#[test]
fn test_env_overrides() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_VEIL_DB_PASSWORD", "x");
    std::env::set_var("VEIL_PSEUDONYMIZATION_SALT", "rotated");
    std::env::set_var("VEIL_POSTGRESQL_HOST", "replica.internal");
    std::env::set_var("VEIL_APPLICATION_DRY_RUN", "true");

    let file = write_config(COMPLETE);
    let config = load_config(file.path()).unwrap();

    assert_eq!(
        config.pseudonymization.salt.expose_secret().as_ref(),
        "rotated"
    );
    assert_eq!(config.postgresql.host, "replica.internal");
    assert!(config.application.dry_run);

    cleanup_env_vars();
}

#[test]
fn test_minimal_config_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[pseudonymization]
salt = "pepper"

[postgresql]
host = "localhost"
database = "analytics"
username = "loader"
password = "secret"
"#,
    );
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.pseudonymization.locale_default, "NA");
    assert_eq!(
        config.pseudonymization.reverse_lookup(),
        ReverseLookup::OnDemand
    );
    assert_eq!(config.queue.region, "us-east-1");
    assert!(!config.queue.delete_after_load);
    assert_eq!(config.postgresql.port, 5432);
    assert_eq!(config.postgresql.table, "user_logins");
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_empty_salt_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[pseudonymization]
salt = ""

[postgresql]
host = "localhost"
database = "analytics"
username = "loader"
password = "secret"
"#,
    );
    let err = load_config(file.path()).unwrap_err();

    assert!(err.to_string().contains("salt"));
}

#[test]
fn test_table_name_injection_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[pseudonymization]
salt = "pepper"

[postgresql]
host = "localhost"
database = "analytics"
username = "loader"
password = "secret"
table = "user_logins; DROP TABLE users"
"#,
    );

    assert!(load_config(file.path()).is_err());
}
