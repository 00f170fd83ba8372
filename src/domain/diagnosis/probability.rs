//! Fixed-length probability distribution over disease classes

use serde::Serialize;

use super::disease::DiseaseClass;
use crate::domain::DomainError;

/// Probability vector aligned with `DiseaseClass::ALL`.
///
/// Components are always finite and non-negative. Vectors coming from a
/// classifier are trusted to be normalized and are never reweighted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityVector([f64; DiseaseClass::COUNT]);

impl ProbabilityVector {
    /// Build a vector from raw components
    pub fn new(components: [f64; DiseaseClass::COUNT]) -> Result<Self, DomainError> {
        for (i, value) in components.iter().enumerate() {
            if !value.is_finite() || *value < 0.0 {
                return Err(DomainError::processing(format!(
                    "Probability for '{}' is invalid: {}",
                    DiseaseClass::ALL[i],
                    value
                )));
            }
        }

        Ok(Self(components))
    }

    /// Build a vector from classifier output
    pub fn from_slice(values: &[f32]) -> Result<Self, DomainError> {
        if values.len() != DiseaseClass::COUNT {
            return Err(DomainError::processing(format!(
                "Classifier returned {} probabilities, expected {}",
                values.len(),
                DiseaseClass::COUNT
            )));
        }

        let mut components = [0.0; DiseaseClass::COUNT];

        for (slot, value) in components.iter_mut().zip(values) {
            *slot = f64::from(*value);
        }

        Self::new(components)
    }

    /// Divide every component by the total so the vector sums to 1
    pub fn normalized(raw: [f64; DiseaseClass::COUNT]) -> Result<Self, DomainError> {
        let total: f64 = raw.iter().sum();

        if !total.is_finite() || total <= 0.0 {
            return Err(DomainError::processing(
                "Cannot normalize a vector with non-positive total weight",
            ));
        }

        Self::new(raw.map(|w| w / total))
    }

    pub fn components(&self) -> &[f64; DiseaseClass::COUNT] {
        &self.0
    }

    pub fn get(&self, class: DiseaseClass) -> f64 {
        self.0[class.index()]
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Index of the largest component; the first one wins on ties
    pub fn argmax(&self) -> DiseaseClass {
        let mut best = 0;

        for (i, value) in self.0.iter().enumerate().skip(1) {
            if *value > self.0[best] {
                best = i;
            }
        }

        DiseaseClass::ALL[best]
    }
}
