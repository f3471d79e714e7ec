//! Error types for the classification pipeline.
//!
//! Every failure a pipeline stage can produce maps to one variant of
//! [`ClassifyError`]. All of them are unrecoverable for the request that hit
//! them: the pipeline aborts and hands the error to the caller instead of a
//! forged result. [`ClassifyError::Inference`] may be transient (the model
//! runtime can fail for environmental reasons); the remaining variants indicate
//! deterministic misconfiguration and retrying them blindly will fail again.

use std::path::Path;

use thiserror::Error;

/// Convenient result alias for classification operations.
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Errors produced by the classification pipeline.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The input image is unusable: empty or mismatched pixel buffer,
    /// non-positive dimensions, or a non-square capture.
    #[error("preprocessing failed: {message}")]
    Preprocess {
        /// What made the image unusable.
        message: String,
    },

    /// The input tensor does not match the model's declared input shape.
    ///
    /// The adapter never reshapes or pads; this indicates the pipeline and the
    /// model artifact were configured for different geometries.
    #[error("input tensor shape {actual:?} does not match model input shape {expected:?}")]
    ShapeMismatch {
        /// Shape declared by the model (dynamic dimensions as -1).
        expected: Vec<i64>,
        /// Shape of the tensor that was submitted.
        actual: Vec<usize>,
    },

    /// Model loading or runtime invocation failed.
    #[error("inference failed for model '{model_name}': {context}")]
    Inference {
        /// Name of the model involved.
        model_name: String,
        /// What the adapter was doing when the failure occurred.
        context: String,
        /// Underlying runtime error, when one exists.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The label table and the model's confidence vector disagree in length.
    ///
    /// Indicates version skew between the model artifact and the label table;
    /// the two must be updated together.
    #[error("label table has {labels} entries but the model produced {scores} scores")]
    LabelMapping {
        /// Number of entries in the label table.
        labels: usize,
        /// Length of the confidence vector.
        scores: usize,
    },

    /// Invalid configuration detected before a pipeline existed.
    #[error("configuration error: {message}")]
    Config {
        /// What was wrong with the configuration.
        message: String,
    },

    /// ONNX Runtime environment error raised outside a model call.
    #[error("ONNX Runtime error")]
    Ort(#[from] ort::Error),

    /// Tensor shape arithmetic failed.
    #[error("tensor shape error")]
    Tensor(#[from] ndarray::ShapeError),

    /// Image decoding failed.
    #[error("image load error")]
    ImageLoad(#[from] image::ImageError),
}

impl ClassifyError {
    /// Creates a preprocessing error for an unusable input image.
    pub fn preprocess(message: impl Into<String>) -> Self {
        Self::Preprocess {
            message: message.into(),
        }
    }

    /// Creates a shape mismatch error from the model's declared shape and the
    /// shape that was actually submitted.
    pub fn shape_mismatch(expected: &[i64], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Creates an inference error with the underlying runtime error attached.
    pub fn inference(
        model_name: impl Into<String>,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.into(),
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an inference error without an underlying cause.
    pub fn inference_context(model_name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Inference {
            model_name: model_name.into(),
            context: context.into(),
            source: None,
        }
    }

    /// Creates an inference error for a model that could not be loaded.
    ///
    /// Model load failure and invocation failure share the [`Inference`]
    /// variant; the model path in the context distinguishes them.
    ///
    /// [`Inference`]: ClassifyError::Inference
    pub fn model_load(
        model_path: impl AsRef<Path>,
        reason: impl Into<String>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let path = model_path.as_ref();
        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();
        Self::Inference {
            model_name,
            context: format!(
                "failed to load model at '{}': {}",
                path.display(),
                reason.into()
            ),
            source: source.map(|e| Box::new(e) as _),
        }
    }

    /// Creates a label mapping error from the two disagreeing lengths.
    pub fn label_mapping(labels: usize, scores: usize) -> Self {
        Self::LabelMapping { labels, scores }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Error delivered when the background worker stops before replying.
    pub(crate) fn worker_terminated() -> Self {
        Self::Inference {
            model_name: "classifier-worker".to_string(),
            context: "worker thread stopped before delivering a result".to_string(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_load_derives_name_from_path() {
        let error = ClassifyError::model_load(
            Path::new("models/plant_disease.onnx"),
            "file is missing",
            None::<std::io::Error>,
        );

        match error {
            ClassifyError::Inference {
                model_name,
                context,
                source,
            } => {
                assert_eq!(model_name, "plant_disease");
                assert!(context.contains("models/plant_disease.onnx"));
                assert!(context.contains("file is missing"));
                assert!(source.is_none());
            }
            other => panic!("expected Inference error, got {other:?}"),
        }
    }

    #[test]
    fn shape_mismatch_reports_both_shapes() {
        let error = ClassifyError::shape_mismatch(&[1, 224, 224, 3], &[1, 128, 128, 3]);
        let message = error.to_string();
        assert!(message.contains("[1, 224, 224, 3]"));
        assert!(message.contains("[1, 128, 128, 3]"));
    }

    #[test]
    fn label_mapping_reports_lengths() {
        let message = ClassifyError::label_mapping(38, 1000).to_string();
        assert!(message.contains("38"));
        assert!(message.contains("1000"));
    }
}
