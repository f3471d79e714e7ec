//! Core error handling, configuration, and the ONNX inference adapter.

pub mod config;
pub mod errors;
pub mod inference;
pub mod traits;

pub use config::{
    OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig, ResizeFilter,
};
pub use errors::{ClassifyError, ClassifyResult};
pub use inference::OrtInfer;
pub use traits::InferenceEngine;

/// 4D `f32` tensor in `[batch, height, width, channel]` layout.
pub type Tensor4D = ndarray::Array4<f32>;
