//! Classifier strategy seam

use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use crate::domain::diagnosis::ProbabilityVector;
use crate::domain::DomainError;

/// Preprocessed image in height x width x channel layout, values in [0, 1]
pub type ImageTensor = ndarray::Array3<f32>;

/// Produces a probability vector for a single preprocessed image.
///
/// One implementation is chosen when the application starts and shared by
/// every request.
#[cfg_attr(test, automock)]
pub trait Classifier: Send + Sync + Debug {
    /// Short name reported by health checks
    fn name(&self) -> &'static str;

    /// Classify one image (batch dimension of one)
    fn predict(&self, image: &ImageTensor) -> Result<ProbabilityVector, DomainError>;
}
