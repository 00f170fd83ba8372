//! Lesion Scan
//!
//! Skin lesion classification service:
//! - Up to three images per request, averaged into one diagnosis
//! - ONNX model inference with a random fallback when no model is available
//! - Accounts with Argon2 password hashes and per-user prediction history
//! - SQLite persistence

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{Classifier, PredictionRepository, UserRepository};
use infrastructure::{
    classifier::ClassifierFactory,
    imaging::Preprocessor,
    prediction::{PredictionService, SqlitePredictionRepository},
    storage::{self, InMemoryStore, SqliteMigrator},
    user::{Argon2Hasher, SqliteUserRepository, UserService},
};
use tracing::info;

/// Create the application state backed by the configured SQLite database
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = connect_and_migrate(config).await?;

    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let predictions = Arc::new(SqlitePredictionRepository::new(pool));

    build_state(config, users, predictions)
}

/// Create the application state on top of an in-memory store.
///
/// Nothing survives the process; useful for tests and demos.
pub fn create_in_memory_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store = Arc::new(InMemoryStore::new());

    build_state(config, store.clone(), store)
}

/// Open the database pool and bring the schema up to date
pub async fn connect_and_migrate(config: &AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    info!(url = %config.database.url, "Connecting to SQLite");
    let pool = storage::connect(&config.database).await?;

    SqliteMigrator::new(pool.clone()).run().await?;
    info!("Database schema is up to date");

    Ok(pool)
}

fn build_state(
    config: &AppConfig,
    users: Arc<dyn UserRepository>,
    predictions: Arc<dyn PredictionRepository>,
) -> anyhow::Result<AppState> {
    let classifier: Arc<dyn Classifier> = ClassifierFactory::create(&config.classifier)?;
    info!(classifier = classifier.name(), "Classifier ready");

    let user_service = Arc::new(UserService::new(users.clone(), Arc::new(Argon2Hasher::new())));

    let prediction_service = Arc::new(
        PredictionService::new(
            classifier,
            Preprocessor::new(config.classifier.input_size),
            predictions,
            users,
        )
        .with_max_images(config.upload.max_images),
    );

    Ok(AppState::new(
        user_service,
        prediction_service,
        config.upload.clone(),
    ))
}
