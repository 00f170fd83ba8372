//! In-memory store for users and prediction history

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::prediction::{NewPrediction, PredictionRecord, PredictionRepository};
use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    predictions: Vec<PredictionRecord>,
    next_user_id: i64,
    next_prediction_id: i64,
}

/// Thread-safe in-memory implementation of both repositories.
///
/// Users and predictions live behind one lock so account deletion removes
/// both in a single step. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username() == user.username) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }

        tables.next_user_id += 1;
        let id = UserId::new(tables.next_user_id);
        let created = User::new(id, user.username, user.password_hash, Utc::now());

        tables.users.insert(id, created.clone());

        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;

        match tables.users.get_mut(&user.id()) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user.clone())
            }
            None => Err(DomainError::not_found(format!("User '{}' not found", user.id()))),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;

        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }

        tables.predictions.retain(|p| p.user_id != Some(id));

        Ok(true)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.tables.read().await.users.len())
    }
}

#[async_trait]
impl PredictionRepository for InMemoryStore {
    async fn create(&self, prediction: NewPrediction) -> Result<PredictionRecord, DomainError> {
        let mut tables = self.tables.write().await;

        if let Some(user_id) = prediction.user_id {
            if !tables.users.contains_key(&user_id) {
                return Err(DomainError::storage(format!(
                    "FOREIGN KEY constraint failed: user '{}'",
                    user_id
                )));
            }
        }

        tables.next_prediction_id += 1;

        let record = PredictionRecord {
            id: tables.next_prediction_id,
            user_id: prediction.user_id,
            image: prediction.image,
            disease: prediction.disease,
            confidence: prediction.confidence,
            created_at: Utc::now(),
        };

        tables.predictions.push(record.clone());

        Ok(record)
    }

    async fn list_recent(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, DomainError> {
        let tables = self.tables.read().await;

        // Insertion order is chronological
        Ok(tables
            .predictions
            .iter()
            .rev()
            .filter(|p| p.user_id == Some(user_id))
            .take(limit)
            .cloned()
            .collect())
    }
}
