//! Image decoding and tensor preparation

mod preprocess;

pub use preprocess::{Preprocessor, DEFAULT_INPUT_SIZE};
