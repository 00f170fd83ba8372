//! Diagnosis domain
//!
//! Disease labels, probability vectors and the aggregation that turns
//! per-image classifier output into a single answer.

mod aggregator;
mod disease;
mod probability;

pub use aggregator::{Aggregate, Aggregator};
pub use disease::DiseaseClass;
pub use probability::ProbabilityVector;
