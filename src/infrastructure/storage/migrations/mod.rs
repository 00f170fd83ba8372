//! Schema migrations for the SQLite store

use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use crate::domain::DomainError;

/// Single forward-only schema change
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static str,
}

/// Applies the schema migrations that have not run yet
#[derive(Debug, Clone)]
pub struct SqliteMigrator {
    pool: SqlitePool,
}

impl SqliteMigrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Runs every pending migration in version order
    pub async fn run(&self) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        for migration in schema_migrations() {
            self.run_migration(&migration).await?;
        }

        Ok(())
    }

    /// Runs a single migration and records it in the same transaction
    pub async fn run_migration(&self, migration: &Migration) -> Result<(), DomainError> {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = ?)")
                .bind(migration.version)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to check migration status: {}", e))
                })?;

        if applied {
            debug!(version = migration.version, "Migration already applied");
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit migration: {}", e)))?;

        info!(
            version = migration.version,
            description = migration.description,
            "Applied migration"
        );

        Ok(())
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))?;

        Ok(version)
    }
}

/// Schema for accounts and prediction history
pub fn schema_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Create users table",
            up: r#"
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT UNIQUE NOT NULL,
                    password TEXT NOT NULL,
                    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
                )
            "#,
        },
        Migration {
            version: 2,
            description: "Create predictions table",
            up: r#"
                CREATE TABLE IF NOT EXISTS predictions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER REFERENCES users (id) ON DELETE CASCADE,
                    image_path TEXT NOT NULL,
                    predicted_disease TEXT NOT NULL,
                    confidence REAL NOT NULL,
                    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
                )
            "#,
        },
        Migration {
            version: 3,
            description: "Index predictions by user and time",
            up: r#"
                CREATE INDEX IF NOT EXISTS idx_predictions_user_created
                ON predictions (user_id, created_at DESC)
            "#,
        },
    ]
}
