//! PostgreSQL record sink
//!
//! Inserts one row per record into the configured table using a small
//! connection pool. The table is expected to exist with the columns
//! `user_id, app_version, device_type, masked_ip, locale, masked_device_id, create_date`.

use crate::adapters::sink::RecordSink;
use crate::config::PostgreSQLConfig;
use crate::domain::{OutputRecord, SinkError};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::NoTls;

/// Columns written by [`PostgresSink`], in insert order
pub const COLUMNS: [&str; 7] = [
    "user_id",
    "app_version",
    "device_type",
    "masked_ip",
    "locale",
    "masked_device_id",
    "create_date",
];

/// PostgreSQL sink backed by a `deadpool` connection pool
pub struct PostgresSink {
    pool: Pool,
    config: PostgreSQLConfig,
    insert_sql: String,
}

impl PostgresSink {
    /// Create the sink and its pool
    ///
    /// No connection is opened until the first query; call
    /// [`RecordSink::test_connection`] to fail fast.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::ConnectionLost`] if the pool cannot be built.
    pub fn new(config: PostgreSQLConfig) -> Result<Self, SinkError> {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .user(&config.username)
            .password(config.password.expose_secret().as_ref())
            .application_name("veil")
            .connect_timeout(Duration::from_secs(config.connection_timeout_seconds));

        if config.statement_timeout_seconds > 0 {
            pg_config.options(&format!(
                "-c statement_timeout={}",
                config.statement_timeout_seconds * 1000
            ));
        }

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .build()
            .map_err(|e| SinkError::ConnectionLost(format!("Failed to create connection pool: {e}")))?;

        let insert_sql = insert_statement(&config.table);

        Ok(Self {
            pool,
            config,
            insert_sql,
        })
    }

    async fn connection(&self) -> Result<deadpool_postgres::Object, SinkError> {
        self.pool
            .get()
            .await
            .map_err(|e| SinkError::ConnectionLost(format!("Failed to get connection from pool: {e}")))
    }

    /// Connection description without the password
    pub fn connection_string_safe(&self) -> String {
        format!(
            "postgresql://{}:***@{}:{}/{}",
            self.config.username, self.config.host, self.config.port, self.config.database
        )
    }

    pub fn table(&self) -> &str {
        &self.config.table
    }
}

#[async_trait]
impl RecordSink for PostgresSink {
    async fn test_connection(&self) -> Result<(), SinkError> {
        let client = self.connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| SinkError::ConnectionLost(format!("Connection test failed: {e}")))?;

        tracing::info!(
            target_db = %self.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    async fn insert(&self, record: &OutputRecord) -> Result<(), SinkError> {
        let client = self.connection().await?;

        client
            .execute(
                self.insert_sql.as_str(),
                &[
                    &record.user_id,
                    &record.app_version,
                    &record.device_type,
                    &record.masked_ip,
                    &record.locale,
                    &record.masked_device_id,
                    &record.create_date,
                ],
            )
            .await
            .map_err(classify_error)?;

        Ok(())
    }
}

/// Parameterized insert for `table`
pub fn insert_statement(table: &str) -> String {
    let placeholders = (1..=COLUMNS.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        COLUMNS.join(", "),
        placeholders
    )
}

/// Server-side rejections fail the record; transport failures end the run
fn classify_error(e: tokio_postgres::Error) -> SinkError {
    let transport = e.is_closed()
        || std::error::Error::source(&e)
            .is_some_and(|source| source.downcast_ref::<std::io::Error>().is_some());

    if transport && e.as_db_error().is_none() {
        SinkError::ConnectionLost(e.to_string())
    } else {
        SinkError::WriteFailed(e.to_string())
    }
}
