//! Upload intake and validation for prediction requests

use crate::domain::DomainError;

/// Largest number of images accepted in one prediction request
pub const MAX_IMAGES: usize = 3;

/// File extensions accepted for upload (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

const GENERIC_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw image received from the client
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(
        filename: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Uploads with an empty filename are placeholders and never processed
    pub fn is_empty(&self) -> bool {
        self.filename.is_empty()
    }

    /// MIME type of the upload, guessed from the filename when the client
    /// sent none or only `application/octet-stream`
    pub fn mime_type(&self) -> String {
        match &self.content_type {
            Some(ct) if !ct.is_empty() && ct != GENERIC_CONTENT_TYPE => ct.clone(),
            _ => mime_guess::from_path(&self.filename)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        }
    }
}

/// Check whether a filename carries one of the allowed extensions
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Validate the uploaded set before any decoding happens.
///
/// Rules, in order:
/// - at least one upload with a non-empty filename
/// - every non-empty filename has a png/jpg/jpeg extension
/// - no more than `max_images` uploads
pub fn validate_uploads(images: &[UploadedImage], max_images: usize) -> Result<(), DomainError> {
    if images.iter().all(UploadedImage::is_empty) {
        return Err(DomainError::validation("no image provided"));
    }

    if images
        .iter()
        .any(|image| !image.is_empty() && !allowed_file(&image.filename))
    {
        return Err(DomainError::validation("invalid file type"));
    }

    if images.len() > max_images {
        return Err(DomainError::validation("too many images"));
    }

    Ok(())
}
