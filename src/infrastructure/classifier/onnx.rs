//! ONNX model classifier backed by tract

use std::path::{Path, PathBuf};

use tract_onnx::prelude::*;

use crate::domain::{Classifier, DomainError, ImageTensor, ProbabilityVector};

type Plan = TypedRunnableModel<TypedModel>;

/// Softmax classifier exported to ONNX with a `[1, size, size, 3]` f32 input
pub struct OnnxClassifier {
    plan: Plan,
    size: usize,
    path: PathBuf,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("path", &self.path)
            .field("size", &self.size)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load and optimize the model at `path`
    pub fn load(path: impl AsRef<Path>, size: u32) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let side = size as usize;

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, side, side, 3]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                DomainError::configuration(format!(
                    "Failed to load model '{}': {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self {
            plan,
            size: side,
            path: path.to_path_buf(),
        })
    }

    fn run(&self, image: &ImageTensor) -> TractResult<Vec<f32>> {
        let standard = image.as_standard_layout();
        let data = standard
            .as_slice()
            .ok_or_else(|| anyhow::anyhow!("image tensor is not contiguous"))?;

        let input = Tensor::from_shape(&[1, self.size, self.size, 3], data)?;
        let outputs = self.plan.run(tvec!(input.into()))?;
        let probabilities = outputs[0].to_array_view::<f32>()?;

        Ok(probabilities.iter().copied().collect())
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn predict(&self, image: &ImageTensor) -> Result<ProbabilityVector, DomainError> {
        let expected = [self.size, self.size, 3];

        if image.shape() != &expected[..] {
            return Err(DomainError::processing(format!(
                "Expected image tensor of shape {:?}, got {:?}",
                expected,
                image.shape()
            )));
        }

        let values = self
            .run(image)
            .map_err(|e| DomainError::processing(format!("Inference failed: {}", e)))?;

        ProbabilityVector::from_slice(&values)
    }
}
