//! Error envelope returned by every failing endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Error kinds reported in the `error` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    ValidationError,
    AuthError,
    NotFoundError,
    ConflictError,
    DecodeError,
    ProcessingError,
    NoValidImagesError,
    PayloadTooLargeError,
    StorageError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationError => write!(f, "validation_error"),
            Self::AuthError => write!(f, "auth_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ConflictError => write!(f, "conflict_error"),
            Self::DecodeError => write!(f, "decode_error"),
            Self::ProcessingError => write!(f, "processing_error"),
            Self::NoValidImagesError => write!(f, "no_valid_images_error"),
            Self::PayloadTooLargeError => write!(f, "payload_too_large_error"),
            Self::StorageError => write!(f, "storage_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// `{ "success": false, "error": <kind>, "message": <text> }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorType,
    pub message: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                success: false,
                error: error_type,
                message: message.into(),
            },
        }
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::ValidationError, message)
    }

    /// Authentication error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ApiErrorType::AuthError, message)
    }

    /// Not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn error_type(&self) -> ApiErrorType {
        self.response.error
    }

    pub fn message(&self) -> &str {
        &self.response.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();

        match &err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Auth { message } => Self::unauthorized(message),
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Conflict { message } => {
                Self::new(StatusCode::BAD_REQUEST, ApiErrorType::ConflictError, message)
            }
            DomainError::NoValidImages => Self::new(
                StatusCode::BAD_REQUEST,
                ApiErrorType::NoValidImagesError,
                message,
            ),
            DomainError::Decode { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorType::DecodeError,
                message,
            ),
            DomainError::Processing { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorType::ProcessingError,
                message,
            ),
            DomainError::Storage { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorType::StorageError,
                message,
            ),
            DomainError::Configuration { .. } => Self::internal(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.response.error, self.response.message)
    }
}

impl std::error::Error for ApiError {}
