//! Decode uploaded bytes into a normalized RGB tensor

use image::imageops::{self, FilterType};
use ndarray::Array3;

use crate::domain::{DomainError, ImageTensor};

/// Edge length of the square classifier input
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Turns raw image bytes into a `size x size x 3` tensor with values in [0, 1]
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    size: u32,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}

impl Preprocessor {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Decode, force RGB, stretch to the target size and scale to [0, 1].
    ///
    /// Grayscale input is replicated across channels and alpha is dropped.
    /// Aspect ratio is not preserved.
    pub fn preprocess(&self, bytes: &[u8]) -> Result<ImageTensor, DomainError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| DomainError::decode(e.to_string()))?;

        let rgb = decoded.to_rgb8();
        let resized = imageops::resize(&rgb, self.size, self.size, FilterType::CatmullRom);

        let side = self.size as usize;
        let tensor = Array3::from_shape_fn((side, side, 3), |(y, x, c)| {
            f32::from(resized.get_pixel(x as u32, y as u32)[c]) / 255.0
        });

        Ok(tensor)
    }
}
