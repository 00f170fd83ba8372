//! Prediction history domain

mod entity;
mod repository;

pub use entity::{NewPrediction, PredictionRecord};
pub use repository::PredictionRepository;

#[cfg(test)]
pub use repository::MockPredictionRepository;
