//! Chooses the classifier strategy once at startup

use std::sync::Arc;

use tracing::{info, warn};

use super::FallbackClassifier;
use crate::config::ClassifierConfig;
use crate::domain::{Classifier, DomainError};

/// Builds the process-wide classifier from configuration
pub struct ClassifierFactory;

impl ClassifierFactory {
    /// Load the configured model, or substitute the random fallback.
    ///
    /// Fails only when the model cannot be loaded and fallback is disabled.
    pub fn create(config: &ClassifierConfig) -> Result<Arc<dyn Classifier>, DomainError> {
        let Some(path) = config.model_path.as_deref() else {
            return Self::fallback(config, "no model path configured".to_string());
        };

        match Self::load_model(path, config.input_size) {
            Ok(classifier) => {
                info!(path = %path, "Classifier model loaded");
                Ok(classifier)
            }
            Err(e) => Self::fallback(config, e.to_string()),
        }
    }

    #[cfg(feature = "onnx")]
    fn load_model(path: &str, input_size: u32) -> Result<Arc<dyn Classifier>, DomainError> {
        let classifier = super::OnnxClassifier::load(path, input_size)?;
        Ok(Arc::new(classifier))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_model(path: &str, _input_size: u32) -> Result<Arc<dyn Classifier>, DomainError> {
        Err(DomainError::configuration(format!(
            "cannot load '{}': built without the `onnx` feature",
            path
        )))
    }

    fn fallback(
        config: &ClassifierConfig,
        reason: String,
    ) -> Result<Arc<dyn Classifier>, DomainError> {
        if !config.allow_fallback {
            return Err(DomainError::configuration(format!(
                "Classifier unavailable and fallback disabled: {}",
                reason
            )));
        }

        warn!(reason = %reason, "Model not loaded, using fallback predictions");
        Ok(Arc::new(FallbackClassifier::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_model_path_uses_fallback() {
        let classifier = ClassifierFactory::create(&ClassifierConfig::default()).unwrap();
        assert_eq!(classifier.name(), "fallback");
    }

    #[test]
    fn test_unloadable_model_uses_fallback() {
        let config = ClassifierConfig {
            model_path: Some("missing/model.onnx".to_string()),
            ..ClassifierConfig::default()
        };

        let classifier = ClassifierFactory::create(&config).unwrap();
        assert_eq!(classifier.name(), "fallback");
    }

    #[test]
    fn test_fallback_disabled() {
        let config = ClassifierConfig {
            model_path: Some("missing/model.onnx".to_string()),
            allow_fallback: false,
            ..ClassifierConfig::default()
        };

        let result = ClassifierFactory::create(&config);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
