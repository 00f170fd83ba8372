//! Persisted prediction records

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::diagnosis::DiseaseClass;
use crate::domain::user::UserId;

/// Prediction to be stored; the store assigns ID and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    /// Owner, `None` for anonymous uploads
    pub user_id: Option<UserId>,
    /// Reference image as a data URL
    pub image: String,
    pub disease: DiseaseClass,
    pub confidence: f64,
}

/// Stored result of one `/predict` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub user_id: Option<UserId>,
    pub image: String,
    pub disease: DiseaseClass,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}
