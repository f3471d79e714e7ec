//! Trait seam between the pipeline and concrete model runtimes.

use crate::core::Tensor4D;
use crate::core::errors::ClassifyError;

/// A loaded model that scores a preprocessed image tensor.
///
/// The pipeline talks to the model runtime exclusively through this trait, so
/// tests can substitute stub engines for the ONNX-backed
/// [`OrtInfer`](crate::core::inference::OrtInfer). Implementations must hold
/// the model in a loaded, ready state for the lifetime of the value and
/// release it on drop.
pub trait InferenceEngine: Send + Sync + std::fmt::Debug {
    /// The model's declared input shape, if the runtime exposes one.
    ///
    /// Dynamic dimensions are reported as -1.
    fn input_shape(&self) -> Option<Vec<i64>>;

    /// The model's declared output length (number of classes), if known.
    fn output_len(&self) -> Option<usize>;

    /// Runs the model on a `[1, H, W, 3]` tensor and returns the raw
    /// confidence vector, one score per class, with no post-processing.
    ///
    /// Blocks the calling thread until the runtime returns.
    fn infer(&self, tensor: &Tensor4D) -> Result<Vec<f32>, ClassifyError>;

    /// Human-readable model name used in logs and error context.
    fn model_name(&self) -> &str;
}
