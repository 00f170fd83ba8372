//! SQLite user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

/// SQLite implementation of UserRepository
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query("SELECT id, username, password, created_at FROM users WHERE id = ?")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT id, username, password, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by username: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let created_at = Utc::now();

        let result = sqlx::query("INSERT INTO users (username, password, created_at) VALUES (?, ?, ?)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::conflict(
                    format!("Username '{}' already exists", user.username),
                ),
                _ => DomainError::storage(format!("Failed to create user: {}", e)),
            })?;

        Ok(User::new(
            UserId::new(result.last_insert_rowid()),
            user.username,
            user.password_hash,
            created_at,
        ))
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE id = ?")
            .bind(user.password_hash())
            .bind(user.id().value())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update user: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", user.id())));
        }

        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("DELETE FROM predictions WHERE user_id = ?")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete predictions: {}", e)))?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Ok(false);
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit deletion: {}", e)))?;

        Ok(true)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count users: {}", e)))?;

        Ok(count as usize)
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Invalid user row: {}", e));

    let id: i64 = row.try_get("id").map_err(read)?;
    let username: String = row.try_get("username").map_err(read)?;
    let password_hash: String = row.try_get("password").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;

    Ok(User::new(UserId::new(id), username, password_hash, created_at))
}
