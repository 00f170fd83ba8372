//! Randomized stand-in for a missing classifier model

use rand::Rng;
use tracing::warn;

use crate::domain::{Classifier, DiseaseClass, DomainError, ImageTensor, ProbabilityVector};

/// Range of the raw weight given to the dominant class
pub const DOMINANT_WEIGHT_RANGE: std::ops::RangeInclusive<f64> = 0.7..=0.95;

/// One random draw before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDraw {
    pub dominant: DiseaseClass,
    pub weights: [f64; DiseaseClass::COUNT],
}

impl FallbackDraw {
    /// Pick a dominant class with a weight in [0.7, 0.95]; every other class
    /// gets an independent weight in [0, 1).
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let dominant_idx = rng.gen_range(0..DiseaseClass::COUNT);
        let mut weights = [0.0; DiseaseClass::COUNT];

        for (i, weight) in weights.iter_mut().enumerate() {
            *weight = if i == dominant_idx {
                rng.gen_range(DOMINANT_WEIGHT_RANGE)
            } else {
                rng.gen_range(0.0..1.0)
            };
        }

        Self {
            dominant: DiseaseClass::ALL[dominant_idx],
            weights,
        }
    }

    /// Normalize the raw weights into a distribution.
    ///
    /// The dominant class usually stays the arg-max but other weights can outgrow it.
    pub fn probabilities(&self) -> Result<ProbabilityVector, DomainError> {
        ProbabilityVector::normalized(self.weights)
    }
}

/// Classifier used when no model could be loaded.
///
/// Ignores the image and returns a random but well-formed distribution so the
/// rest of the pipeline can run end to end.
#[derive(Debug, Clone, Default)]
pub struct FallbackClassifier;

impl FallbackClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for FallbackClassifier {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn predict(&self, _image: &ImageTensor) -> Result<ProbabilityVector, DomainError> {
        warn!("Using fallback (random) prediction, no model loaded");
        FallbackDraw::sample(&mut rand::thread_rng()).probabilities()
    }
}
