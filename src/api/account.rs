//! Account endpoints
//!
//! Signup, login, password change/reset and account deletion.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{User, UserId};
use crate::infrastructure::user::{CreateUserRequest, UpdatePasswordRequest};

/// Create the account router
pub fn create_account_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/change-password", post(change_password))
        .route("/reset-password", post(reset_password))
        .route("/user/{id}", delete(delete_account))
}

/// Signup and login body
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub user_id: Option<i64>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub username: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: Option<String>,
}

/// Signup and login response
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub success: bool,
    pub message: String,
    pub user_id: UserId,
    pub username: String,
}

impl AccountResponse {
    fn from_user(user: &User, message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            user_id: user.id(),
            username: user.username().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

/// Treat empty strings like absent fields
fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Register a new account
///
/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let (Some(username), Some(password)) =
        (required(request.username), required(request.password))
    else {
        return Err(ApiError::bad_request("Username and password are required"));
    };

    let user = state
        .user_service
        .create(CreateUserRequest { username, password })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse::from_user(&user, "Signup successful")),
    ))
}

/// Check username and password
///
/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let username = request.username.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let user = state
        .user_service
        .authenticate(&username, &password)
        .await?;

    info!(user_id = %user.id(), "User logged in");

    Ok(Json(AccountResponse::from_user(&user, "Login successful")))
}

/// Change a password after checking the current one
///
/// POST /change-password
pub async fn change_password(
    State(state): State<AppState>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (Some(user_id), Some(current_password), Some(new_password)) = (
        request.user_id,
        required(request.current_password),
        required(request.new_password),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    state
        .user_service
        .update_password(
            UserId::new(user_id),
            UpdatePasswordRequest {
                current_password,
                new_password,
            },
        )
        .await?;

    Ok(Json(MessageResponse::ok("Password changed successfully")))
}

/// Set a new password by username
///
/// POST /reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (Some(username), Some(new_password)) =
        (required(request.username), required(request.new_password))
    else {
        return Err(ApiError::bad_request("Username and new password are required"));
    };

    state
        .user_service
        .reset_password(&username, &new_password)
        .await?;

    Ok(Json(MessageResponse::ok("Password reset successfully")))
}

/// Delete an account and its prediction history
///
/// DELETE /user/{id}
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<DeleteAccountRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(password) = required(request.password) else {
        return Err(ApiError::bad_request("Password is required to delete account"));
    };

    state
        .user_service
        .delete(UserId::new(id), &password)
        .await?;

    Ok(Json(MessageResponse::ok("Account deleted successfully")))
}
