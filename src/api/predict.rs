//! Prediction and history endpoints

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiErrorType, Json};
use crate::domain::prediction::PredictionRecord;
use crate::domain::user::UserId;
use crate::domain::{DiseaseClass, UploadedImage};
use crate::infrastructure::prediction::{AggregatedResult, PredictionRequest};

/// Filename reported for the single aggregated entry in `predictions`
const AGGREGATED_FILENAME: &str = "aggregated_result";

/// Create the prediction router
pub fn create_prediction_router() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict))
        .route("/history", get(history))
}

/// One entry of the `predictions` list
#[derive(Debug, Serialize)]
pub struct PredictionItem {
    pub filename: String,
    pub disease: DiseaseClass,
    pub confidence: f64,
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub disease: DiseaseClass,
    pub confidence: f64,
    pub image: String,
    pub images_processed: usize,
    pub predictions: Vec<PredictionItem>,
}

impl From<AggregatedResult> for PredictResponse {
    fn from(result: AggregatedResult) -> Self {
        let item = PredictionItem {
            filename: AGGREGATED_FILENAME.to_string(),
            disease: result.disease,
            confidence: result.confidence,
            image: result.image.clone(),
        };

        Self {
            success: true,
            disease: result.disease,
            confidence: result.confidence,
            image: result.image,
            images_processed: result.images_processed,
            predictions: vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: i64,
    pub image_path: String,
    pub predicted_disease: DiseaseClass,
    pub confidence: f64,
    pub created_at: String,
}

impl From<PredictionRecord> for HistoryItem {
    fn from(record: PredictionRecord) -> Self {
        Self {
            id: record.id,
            image_path: record.image,
            predicted_disease: record.disease,
            confidence: record.confidence,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<HistoryItem>,
}

/// Parse an optional `user_id` value; blank means anonymous
fn parse_user_id(raw: &str) -> Result<Option<UserId>, ApiError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Ok(None);
    }

    UserId::parse(raw)
        .map(Some)
        .map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Keep the status multer reports: 413 for an oversized body, 400 for a malformed one
fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    let status = err.status();

    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(
            status,
            ApiErrorType::PayloadTooLargeError,
            format!("Payload too large: request body exceeds {} bytes", limit),
        );
    }

    ApiError::new(
        status,
        ApiErrorType::ValidationError,
        format!("Invalid multipart body: {}", err.body_text()),
    )
}

/// Classify up to three lesion images and store the aggregated answer
///
/// POST /predict (multipart: `image` files, optional `user_id`)
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        ApiError::new(
            e.status(),
            ApiErrorType::ValidationError,
            format!("Invalid multipart request: {}", e.body_text()),
        )
    })?;

    let limit = state.upload.max_body_bytes;
    let mut request = PredictionRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());

                let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

                request
                    .images
                    .push(UploadedImage::new(filename, content_type, bytes.to_vec()));
            }
            "user_id" => {
                let text = field.text().await.map_err(|e| multipart_error(e, limit))?;

                request.user_id = parse_user_id(&text)?;
            }
            other => debug!(field = other, "Ignoring multipart field"),
        }
    }

    let result = state.prediction_service.predict(request).await?;

    Ok(Json(result.into()))
}

/// Ten most recent predictions of a user
///
/// GET /history?user_id=N
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let user_id = query
        .user_id
        .as_deref()
        .map(parse_user_id)
        .transpose()?
        .flatten()
        .ok_or_else(|| ApiError::bad_request("user_id is required"))?;

    let records = state.prediction_service.history(user_id).await?;

    Ok(Json(HistoryResponse {
        success: true,
        history: records.into_iter().map(HistoryItem::from).collect(),
    }))
}
