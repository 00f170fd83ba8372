//! Prediction infrastructure - the classification pipeline and its storage

mod service;
mod sqlite_repository;

pub use service::{
    classify_batch, to_data_url, AggregatedResult, PredictionRequest, PredictionService,
    HISTORY_LIMIT,
};
pub use sqlite_repository::SqlitePredictionRepository;
