//! Image preprocessing and confidence decoding.

pub mod decode;
pub mod preprocess;

pub use decode::ConfidenceDecoder;
pub use preprocess::{Normalizer, Preprocessor};
