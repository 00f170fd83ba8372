//! Multi-image aggregation of classifier output

use serde::Serialize;

use super::disease::DiseaseClass;
use super::probability::ProbabilityVector;
use crate::domain::DomainError;

/// Collapsed decision for a batch of images
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    /// Averaged probability vector
    pub averaged: ProbabilityVector,
    /// Arg-max of the averaged vector
    pub disease: DiseaseClass,
    /// Winning averaged probability as a percentage
    pub confidence: f64,
    /// Number of vectors that contributed
    pub images_processed: usize,
}

/// Running element-wise sum of per-image probability vectors
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    totals: [f64; DiseaseClass::COUNT],
    count: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the vector produced for one successfully processed image
    pub fn add(&mut self, probabilities: &ProbabilityVector) {
        for (total, p) in self.totals.iter_mut().zip(probabilities.components()) {
            *total += p;
        }

        self.count += 1;
    }

    /// Average the summed vectors and pick the winning class
    pub fn finish(self) -> Result<Aggregate, DomainError> {
        if self.count == 0 {
            return Err(DomainError::NoValidImages);
        }

        let count = self.count as f64;
        let averaged = ProbabilityVector::new(self.totals.map(|t| t / count))?;
        let disease = averaged.argmax();

        Ok(Aggregate {
            averaged,
            disease,
            confidence: averaged.get(disease) * 100.0,
            images_processed: self.count,
        })
    }
}
