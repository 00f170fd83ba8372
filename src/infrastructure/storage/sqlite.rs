//! SQLite connection pool

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// Open (creating if needed) the database file with foreign keys enforced
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DomainError> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| DomainError::configuration(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to open database: {}", e)))?;

    info!(url = %config.url, "SQLite database opened");

    Ok(pool)
}

/// Private in-memory database, kept alive on a single connection
pub async fn connect_in_memory() -> Result<SqlitePool, DomainError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| DomainError::configuration(format!("Invalid database URL: {}", e)))?
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to open database: {}", e)))
}
