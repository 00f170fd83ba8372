use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    #[error("Processing error: {message}")]
    Processing { message: String },

    #[error("No valid images processed")]
    NoValidImages,

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("too many images");
        assert_eq!(error.to_string(), "Validation error: too many images");
    }

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("User '7' not found");
        assert_eq!(error.to_string(), "Not found: User '7' not found");
    }

    #[test]
    fn test_no_valid_images_error() {
        assert_eq!(
            DomainError::NoValidImages.to_string(),
            "No valid images processed"
        );
    }

    #[test]
    fn test_decode_error() {
        let error = DomainError::decode("unsupported format");
        assert_eq!(
            error.to_string(),
            "Failed to decode image: unsupported format"
        );
    }
}
