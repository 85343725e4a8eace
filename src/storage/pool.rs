//! # Database Connection Pool Management
//!
//! Creates the SQLite pool backing the persistent stores.

use crate::config::StorageConfig;
use crate::errors::{DeadswitchError, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::{str::FromStr, time::Duration};

/// Type alias for the database connection pool
pub type DbPool = Pool<Sqlite>;

const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a database connection pool with the specified configuration
pub async fn create_pool(config: &StorageConfig) -> Result<DbPool> {
    validate_config(config)?;

    let in_memory = config.is_in_memory_sqlite();

    let mut connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| {
            DeadswitchError::database(
                e,
                format!("Invalid SQLite connection string: {}", config.database_url),
            )
        })?
        .create_if_missing(true)
        .busy_timeout(SQLITE_BUSY_TIMEOUT);

    // A private in-memory database lives exactly as long as its one connection
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        ensure_parent_dir(&config.database_url)?;
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options
        .acquire_timeout(config.connect_timeout())
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                url = %config.database_url,
                busy_timeout_ms = SQLITE_BUSY_TIMEOUT.as_millis(),
                "Failed to create SQLite database pool"
            );
            DeadswitchError::database(
                e,
                format!("Failed to connect to database: {}", config.database_url),
            )
        })?;

    tracing::info!(
        in_memory,
        max_connections = pool.options().get_max_connections(),
        connect_timeout_ms = config.connect_timeout().as_millis(),
        "Database connection pool created"
    );

    if config.auto_migrate {
        tracing::info!("Auto-migration enabled, running database migrations");
        crate::storage::migrations::run_migrations(&pool).await?;
    }

    Ok(pool)
}

fn validate_config(config: &StorageConfig) -> Result<()> {
    if config.max_connections == 0 {
        return Err(DeadswitchError::validation("max_connections must be greater than 0"));
    }

    if !config.database_url.starts_with("sqlite:") {
        return Err(DeadswitchError::validation_field(
            "database URL must start with 'sqlite:'",
            "storage.database_url",
        ));
    }

    Ok(())
}

/// SQLite creates the file but not the directory holding it
fn ensure_parent_dir(url: &str) -> Result<()> {
    let path = url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);

    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| DeadswitchError::Io {
                source: e,
                context: format!("Failed to create database directory {}", parent.display()),
            })?;
        }
    }

    Ok(())
}
