//! Classifier implementations
//!
//! The ONNX classifier is compiled with the `onnx` feature. Without a loadable
//! model the factory falls back to `FallbackClassifier`.

mod factory;
mod fallback;
#[cfg(feature = "onnx")]
mod onnx;

pub use factory::ClassifierFactory;
pub use fallback::{FallbackClassifier, FallbackDraw, DOMINANT_WEIGHT_RANGE};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
