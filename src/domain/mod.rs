//! Domain layer - Core business logic and entities

pub mod classifier;
pub mod diagnosis;
pub mod error;
pub mod intake;
pub mod prediction;
pub mod user;

pub use classifier::{Classifier, ImageTensor};
pub use diagnosis::{Aggregate, Aggregator, DiseaseClass, ProbabilityVector};
pub use error::DomainError;
pub use intake::{validate_uploads, UploadedImage};
pub use prediction::{NewPrediction, PredictionRecord, PredictionRepository};
pub use user::{NewUser, User, UserId, UserRepository};
