//! Application state for shared services

use std::sync::Arc;

use crate::config::UploadConfig;
use crate::infrastructure::prediction::PredictionService;
use crate::infrastructure::user::UserService;

/// Services shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub prediction_service: Arc<PredictionService>,
    pub upload: UploadConfig,
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(
        user_service: Arc<UserService>,
        prediction_service: Arc<PredictionService>,
        upload: UploadConfig,
    ) -> Self {
        Self {
            user_service,
            prediction_service,
            upload,
        }
    }

    /// Name of the classifier strategy selected at startup
    pub fn classifier_name(&self) -> &'static str {
        self.prediction_service.classifier_name()
    }
}
