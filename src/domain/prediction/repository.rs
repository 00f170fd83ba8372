//! Prediction repository trait

use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::entity::{NewPrediction, PredictionRecord};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Append-only store of prediction records.
///
/// Records are removed only when their owner's account is deleted
/// (see `UserRepository::delete`).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PredictionRepository: Send + Sync + Debug {
    /// Insert a record and return it with its assigned ID and timestamp
    async fn create(&self, prediction: NewPrediction) -> Result<PredictionRecord, DomainError>;

    /// Most recent records for a user, newest first
    async fn list_recent(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, DomainError>;
}
