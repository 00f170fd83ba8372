//! SQLite prediction repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::domain::prediction::{NewPrediction, PredictionRecord, PredictionRepository};
use crate::domain::user::UserId;
use crate::domain::{DiseaseClass, DomainError};

/// SQLite implementation of PredictionRepository
#[derive(Debug, Clone)]
pub struct SqlitePredictionRepository {
    pool: SqlitePool,
}

impl SqlitePredictionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PredictionRepository for SqlitePredictionRepository {
    async fn create(&self, prediction: NewPrediction) -> Result<PredictionRecord, DomainError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO predictions (user_id, image_path, predicted_disease, confidence, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(prediction.user_id.map(|id| id.value()))
        .bind(&prediction.image)
        .bind(prediction.disease.label())
        .bind(prediction.confidence)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to save prediction: {}", e)))?;

        Ok(PredictionRecord {
            id: result.last_insert_rowid(),
            user_id: prediction.user_id,
            image: prediction.image,
            disease: prediction.disease,
            confidence: prediction.confidence,
            created_at,
        })
    }

    async fn list_recent(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, image_path, predicted_disease, confidence, created_at
            FROM predictions
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id.value())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to load history: {}", e)))?;

        rows.iter().map(row_to_record).collect()
    }
}

fn row_to_record(row: &SqliteRow) -> Result<PredictionRecord, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Invalid prediction row: {}", e));

    let label: String = row.try_get("predicted_disease").map_err(read)?;
    let disease = DiseaseClass::from_label(&label).ok_or_else(|| {
        DomainError::storage(format!("Unknown disease label in database: '{}'", label))
    })?;
    let user_id: Option<i64> = row.try_get("user_id").map_err(read)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read)?;

    Ok(PredictionRecord {
        id: row.try_get("id").map_err(read)?,
        user_id: user_id.map(UserId::new),
        image: row.try_get("image_path").map_err(read)?,
        disease,
        confidence: row.try_get("confidence").map_err(read)?,
        created_at,
    })
}
