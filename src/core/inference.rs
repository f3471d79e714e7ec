//! ONNX Runtime inference adapter.
//!
//! [`OrtInfer`] owns the loaded session for one model artifact. The session is
//! created once at construction and released when the adapter drops, so the
//! model is guaranteed ready before the first call and never leaks across
//! repeated classifications. A `Mutex` serializes concurrent calls against the
//! single handle; the underlying runtime session is not assumed thread-safe.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ort::execution_providers::ExecutionProviderDispatch;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::value::{TensorRef, ValueType};

use crate::core::Tensor4D;
use crate::core::config::{OrtExecutionProvider, OrtSessionConfig};
use crate::core::errors::ClassifyError;
use crate::core::traits::InferenceEngine;

/// Names commonly given to the image input tensor by model exporters.
const COMMON_INPUT_NAMES: [&str; 5] = ["x", "input", "images", "data", "image"];

/// ONNX Runtime inference engine for `[1, H, W, 3] -> [1, N]` classification
/// models.
pub struct OrtInfer {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_shape: Option<Vec<i64>>,
    output_len: Option<usize>,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_shape", &self.input_shape)
            .field("output_len", &self.output_len)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Creates an adapter with default ONNX Runtime settings.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        Self::from_config(&OrtSessionConfig::default(), model_path)
    }

    /// Creates an adapter, applying the given session configuration.
    ///
    /// Input and output tensor names and shapes are discovered from the
    /// session metadata; use [`with_input_name`](Self::with_input_name) /
    /// [`with_output_name`](Self::with_output_name) to override the discovery.
    pub fn from_config(
        config: &OrtSessionConfig,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, ClassifyError> {
        let path = model_path.as_ref();
        let builder = Self::apply_config(Session::builder()?, config)?;
        let session = builder.commit_from_file(path).map_err(|e| {
            ClassifyError::model_load(path, "failed to create ONNX session", Some(e))
        })?;

        let available_inputs: Vec<String> =
            session.inputs.iter().map(|i| i.name.clone()).collect();
        let input_name = COMMON_INPUT_NAMES
            .iter()
            .find(|&&name| available_inputs.iter().any(|input| input == name))
            .map(|&name| name.to_string())
            .or_else(|| available_inputs.first().cloned())
            .ok_or_else(|| {
                ClassifyError::model_load(
                    path,
                    "model declares no inputs",
                    None::<ort::Error>,
                )
            })?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                ClassifyError::model_load(
                    path,
                    "model declares no outputs",
                    None::<ort::Error>,
                )
            })?;

        let input_shape = session
            .inputs
            .iter()
            .find(|input| input.name == input_name)
            .and_then(|input| match &input.input_type {
                ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
                _ => None,
            });
        let output_len = session
            .outputs
            .first()
            .and_then(|output| match &output.output_type {
                ValueType::Tensor { shape, .. } => {
                    shape.last().copied().filter(|&n| n > 0).map(|n| n as usize)
                }
                _ => None,
            });

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        tracing::debug!(
            model = %model_name,
            path = %path.display(),
            input = %input_name,
            output = %output_name,
            ?input_shape,
            ?output_len,
            "ONNX session ready"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_shape,
            output_len,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Overrides the auto-detected input tensor name.
    pub fn with_input_name(mut self, name: impl Into<String>) -> Self {
        self.input_name = name.into();
        self
    }

    /// Overrides the auto-detected output tensor name.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Overrides the model name used in logs and errors.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Returns the model path backing this adapter.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn apply_config(
        mut builder: SessionBuilder,
        config: &OrtSessionConfig,
    ) -> Result<SessionBuilder, ort::Error> {
        builder = builder.with_log_level(LogLevel::Error)?;
        if let Some(intra) = config.intra_threads {
            builder = builder.with_intra_threads(intra)?;
        }
        if let Some(inter) = config.inter_threads {
            builder = builder.with_inter_threads(inter)?;
        }
        if let Some(parallel) = config.parallel_execution {
            builder = builder.with_parallel_execution(parallel)?;
        }
        if let Some(level) = config.optimization_level {
            use crate::core::config::OrtGraphOptimizationLevel as OG;
            let mapped = match level {
                OG::DisableAll => GraphOptimizationLevel::Disable,
                OG::Level1 => GraphOptimizationLevel::Level1,
                OG::Level2 => GraphOptimizationLevel::Level2,
                OG::Level3 | OG::All => GraphOptimizationLevel::Level3,
            };
            builder = builder.with_optimization_level(mapped)?;
        }
        if let Some(eps) = &config.execution_providers {
            let providers = Self::build_execution_providers(eps)?;
            if !providers.is_empty() {
                builder = builder.with_execution_providers(providers)?;
            }
        }
        Ok(builder)
    }

    fn build_execution_providers(
        eps: &[OrtExecutionProvider],
    ) -> Result<Vec<ExecutionProviderDispatch>, ort::Error> {
        let mut providers = Vec::new();
        for ep in eps {
            match ep {
                OrtExecutionProvider::CPU => {
                    providers
                        .push(ort::execution_providers::CPUExecutionProvider::default().build());
                }
                #[cfg(feature = "cuda")]
                OrtExecutionProvider::CUDA { device_id } => {
                    let mut cuda = ort::execution_providers::CUDAExecutionProvider::default();
                    if let Some(id) = device_id {
                        cuda = cuda.with_device_id(*id);
                    }
                    providers.push(cuda.build());
                }
                #[cfg(not(feature = "cuda"))]
                OrtExecutionProvider::CUDA { .. } => {
                    return Err(ort::Error::new(
                        "CUDA execution provider requested but the cuda feature is not enabled",
                    ));
                }
            }
        }
        Ok(providers)
    }

    /// Validates the tensor against the model's declared input shape.
    ///
    /// Dynamic dimensions in the declaration accept any extent. A mismatch is
    /// a fatal configuration error; the adapter never reshapes or pads.
    fn validate_shape(&self, tensor: &Tensor4D) -> Result<(), ClassifyError> {
        if let Some(expected) = &self.input_shape {
            if !shape_matches(expected, tensor.shape()) {
                return Err(ClassifyError::shape_mismatch(expected, tensor.shape()));
            }
        }
        Ok(())
    }

    /// Runs the model on a single preprocessed image tensor.
    ///
    /// Blocks until the runtime returns, then extracts the `[1, N]` output as
    /// the raw confidence vector. No post-processing is applied.
    pub fn infer(&self, tensor: &Tensor4D) -> Result<Vec<f32>, ClassifyError> {
        self.validate_shape(tensor)?;

        let input_tensor = TensorRef::from_array_view(tensor.view()).map_err(|e| {
            ClassifyError::inference(
                &self.model_name,
                format!(
                    "failed to convert input tensor with shape {:?}",
                    tensor.shape()
                ),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self.session.lock().map_err(|_| {
            ClassifyError::inference_context(&self.model_name, "session lock poisoned")
        })?;
        let outputs = session.run(inputs).map_err(|e| {
            ClassifyError::inference(
                &self.model_name,
                format!(
                    "ONNX Runtime invocation failed with input '{}' -> output '{}'",
                    self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ClassifyError::inference(
                    &self.model_name,
                    format!(
                        "failed to extract output tensor '{}' as f32",
                        self.output_name
                    ),
                    e,
                )
            })?;

        let dims: &[i64] = output_shape;
        match dims {
            [n] if *n as usize == output_data.len() => Ok(output_data.to_vec()),
            [1, n] if *n as usize == output_data.len() => Ok(output_data.to_vec()),
            _ => Err(ClassifyError::inference_context(
                &self.model_name,
                format!("expected a [1, N] confidence vector, got output shape {dims:?}"),
            )),
        }
    }
}

impl InferenceEngine for OrtInfer {
    fn input_shape(&self) -> Option<Vec<i64>> {
        self.input_shape.clone()
    }

    fn output_len(&self) -> Option<usize> {
        self.output_len
    }

    fn infer(&self, tensor: &Tensor4D) -> Result<Vec<f32>, ClassifyError> {
        OrtInfer::infer(self, tensor)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Whether an actual tensor shape satisfies a declared one.
fn shape_matches(expected: &[i64], actual: &[usize]) -> bool {
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual)
            .all(|(&declared, &extent)| declared <= 0 || declared as usize == extent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_shape_matches() {
        assert!(shape_matches(&[1, 224, 224, 3], &[1, 224, 224, 3]));
    }

    #[test]
    fn dynamic_dimensions_accept_any_extent() {
        assert!(shape_matches(&[-1, 224, 224, 3], &[1, 224, 224, 3]));
        assert!(shape_matches(&[-1, -1, -1, 3], &[1, 640, 640, 3]));
    }

    #[test]
    fn wrong_extent_or_rank_is_rejected() {
        assert!(!shape_matches(&[1, 224, 224, 3], &[1, 128, 128, 3]));
        assert!(!shape_matches(&[1, 224, 224, 3], &[224, 224, 3]));
    }
}
