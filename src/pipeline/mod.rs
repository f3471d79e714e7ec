//! The classification pipeline: preprocess, infer, decode.

pub mod worker;

pub use worker::{ClassifierWorker, PendingClassification};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::config::{OrtSessionConfig, ResizeFilter};
use crate::core::errors::ClassifyError;
use crate::core::inference::OrtInfer;
use crate::core::traits::InferenceEngine;
use crate::domain::{ClassificationResult, LabelTable, RawImage};
use crate::processors::{ConfidenceDecoder, Normalizer, Preprocessor};

/// Default model input edge length.
pub const DEFAULT_TARGET_SIZE: u32 = 224;

fn default_target_size() -> u32 {
    DEFAULT_TARGET_SIZE
}

/// Serializable description of a classification pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path to the ONNX model artifact.
    pub model_path: PathBuf,
    /// Model input edge length (height == width).
    #[serde(default = "default_target_size")]
    pub target_size: u32,
    /// Display name used in logs and errors; defaults to the model file stem.
    #[serde(default)]
    pub model_name: Option<String>,
    /// Resampling filter used when scaling captures to the model input size.
    #[serde(default)]
    pub resize_filter: ResizeFilter,
    /// ONNX Runtime session tuning.
    #[serde(default)]
    pub ort_session: Option<OrtSessionConfig>,
}

impl PipelineConfig {
    /// Creates a config with default preprocessing for the given model path.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            target_size: DEFAULT_TARGET_SIZE,
            model_name: None,
            resize_filter: ResizeFilter::default(),
            ort_session: None,
        }
    }

    /// Parses a config from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, ClassifyError> {
        serde_json::from_str(json)
            .map_err(|e| ClassifyError::config_error(format!("invalid pipeline config: {e}")))
    }
}

/// Classifies a leaf photograph into one of the label table's classes.
///
/// Composes the preprocessor, the inference engine, and the decoder into one
/// synchronous call; the first stage to fail aborts the call and its error
/// kind propagates unchanged, with no partial result. Generic over the engine
/// so tests can run the full pipeline against stub engines; production code
/// uses [`OrtInfer`].
#[derive(Debug)]
pub struct LeafClassifier<E = OrtInfer> {
    engine: E,
    preprocessor: Preprocessor,
    decoder: ConfidenceDecoder,
    labels: LabelTable,
}

impl LeafClassifier<OrtInfer> {
    /// Builds an ONNX-backed classifier from a pipeline config, using the
    /// bundled PlantVillage label table.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ClassifyError> {
        let mut builder = LeafClassifierBuilder::new()
            .target_size(config.target_size)
            .resize_filter(config.resize_filter);
        if let Some(name) = &config.model_name {
            builder = builder.model_name(name.clone());
        }
        if let Some(ort_session) = &config.ort_session {
            builder = builder.with_ort_config(ort_session.clone());
        }
        builder.build(&config.model_path)
    }

    /// Starts a builder with default preprocessing.
    pub fn builder() -> LeafClassifierBuilder {
        LeafClassifierBuilder::new()
    }
}

impl<E: InferenceEngine> LeafClassifier<E> {
    /// Assembles a pipeline from parts.
    ///
    /// When the engine declares its output length, the label table is checked
    /// against it eagerly; a disagreement is model/label version skew and
    /// fails here rather than on the first classification.
    pub fn from_parts(
        engine: E,
        preprocessor: Preprocessor,
        labels: LabelTable,
    ) -> Result<Self, ClassifyError> {
        if let Some(output_len) = engine.output_len() {
            if output_len != labels.len() {
                return Err(ClassifyError::label_mapping(labels.len(), output_len));
            }
        }
        Ok(Self {
            engine,
            preprocessor,
            decoder: ConfidenceDecoder::new(),
            labels,
        })
    }

    /// The label table this classifier decodes against.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// The model input edge length.
    pub fn target_size(&self) -> u32 {
        self.preprocessor.target_size()
    }

    /// Classifies one square capture.
    ///
    /// Deterministic: the same image against the same loaded model produces
    /// the same result on every call. Blocks for the duration of the model
    /// invocation; interactive callers should go through
    /// [`ClassifierWorker`] instead of calling this on their event thread.
    pub fn classify(&self, image: &RawImage) -> Result<ClassificationResult, ClassifyError> {
        let tensor = self.preprocessor.run(image)?;
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            target = self.preprocessor.target_size(),
            "capture preprocessed"
        );

        let confidence = self.engine.infer(&tensor)?;
        let result = self.decoder.decode(&confidence, &self.labels)?;
        tracing::debug!(
            model = self.engine.model_name(),
            class_index = result.class_index,
            label = %result.label,
            confidence = result.confidence,
            "classification decoded"
        );
        Ok(result)
    }

    /// The `k` best-scoring labels for one capture, best first.
    pub fn classify_top_k(
        &self,
        image: &RawImage,
        k: usize,
    ) -> Result<Vec<ClassificationResult>, ClassifyError> {
        let tensor = self.preprocessor.run(image)?;
        let confidence = self.engine.infer(&tensor)?;
        self.decoder.top_k(&confidence, &self.labels, k)
    }
}

/// Builder for an ONNX-backed [`LeafClassifier`].
#[derive(Debug)]
pub struct LeafClassifierBuilder {
    target_size: u32,
    resize_filter: ResizeFilter,
    normalizer: Normalizer,
    labels: Option<LabelTable>,
    model_name: Option<String>,
    ort_session: Option<OrtSessionConfig>,
}

impl Default for LeafClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LeafClassifierBuilder {
    /// Creates a builder with default preprocessing (224x224, nearest
    /// resampling, unit-interval normalization) and the PlantVillage label
    /// table.
    pub fn new() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            resize_filter: ResizeFilter::default(),
            normalizer: Normalizer::unit(),
            labels: None,
            model_name: None,
            ort_session: None,
        }
    }

    /// Sets the model input edge length.
    pub fn target_size(mut self, size: u32) -> Self {
        self.target_size = size;
        self
    }

    /// Sets the resampling filter.
    pub fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }

    /// Sets the pixel normalizer.
    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Replaces the bundled PlantVillage label table.
    pub fn labels(mut self, labels: LabelTable) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Sets the display name used in logs and errors.
    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn with_ort_config(mut self, config: OrtSessionConfig) -> Self {
        self.ort_session = Some(config);
        self
    }

    /// Loads the model and assembles the classifier.
    pub fn build(self, model_path: &Path) -> Result<LeafClassifier<OrtInfer>, ClassifyError> {
        let preprocessor =
            Preprocessor::new(self.target_size, self.resize_filter, self.normalizer)?;
        let mut engine = match &self.ort_session {
            Some(config) => OrtInfer::from_config(config, model_path)?,
            None => OrtInfer::new(model_path)?,
        };
        if let Some(name) = self.model_name {
            engine = engine.with_model_name(name);
        }
        let labels = self.labels.unwrap_or_else(LabelTable::plant_village);
        tracing::info!(
            model = engine.model_name(),
            classes = labels.len(),
            target_size = self.target_size,
            "classifier ready"
        );
        LeafClassifier::from_parts(engine, preprocessor, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Tensor4D;

    #[derive(Debug)]
    struct StubEngine {
        scores: Vec<f32>,
        declared_input: Option<Vec<i64>>,
    }

    impl StubEngine {
        fn returning(scores: Vec<f32>) -> Self {
            Self {
                scores,
                declared_input: None,
            }
        }
    }

    impl InferenceEngine for StubEngine {
        fn input_shape(&self) -> Option<Vec<i64>> {
            self.declared_input.clone()
        }

        fn output_len(&self) -> Option<usize> {
            Some(self.scores.len())
        }

        fn infer(&self, _tensor: &Tensor4D) -> Result<Vec<f32>, ClassifyError> {
            Ok(self.scores.clone())
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    #[derive(Debug)]
    struct FailingEngine;

    impl InferenceEngine for FailingEngine {
        fn input_shape(&self) -> Option<Vec<i64>> {
            None
        }

        fn output_len(&self) -> Option<usize> {
            None
        }

        fn infer(&self, _tensor: &Tensor4D) -> Result<Vec<f32>, ClassifyError> {
            Err(ClassifyError::inference_context(
                "stub",
                "runtime unavailable",
            ))
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn two_class_labels() -> LabelTable {
        LabelTable::new(vec!["A".to_string(), "B".to_string()]).unwrap()
    }

    fn small_preprocessor(target: u32) -> Preprocessor {
        Preprocessor::new(target, ResizeFilter::Nearest, Normalizer::unit()).unwrap()
    }

    #[test]
    fn end_to_end_two_by_two_capture() {
        let classifier = LeafClassifier::from_parts(
            StubEngine::returning(vec![0.1, 0.9]),
            small_preprocessor(2),
            two_class_labels(),
        )
        .unwrap();

        let image = RawImage::new(
            2,
            2,
            vec![0xFF10_2030, 0xFF40_5060, 0xFF70_8090, 0xFFA0_B0C0],
        )
        .unwrap();
        let result = classifier.classify(&image).unwrap();

        assert_eq!(result.class_index, 1);
        assert_eq!(result.label, "B");
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let classifier = LeafClassifier::from_parts(
            StubEngine::returning(vec![0.3, 0.7]),
            small_preprocessor(2),
            two_class_labels(),
        )
        .unwrap();
        let image = RawImage::new(2, 2, vec![0xFF11_2233; 4]).unwrap();

        let first = classifier.classify(&image).unwrap();
        let second = classifier.classify(&image).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn label_skew_is_rejected_at_assembly() {
        let result = LeafClassifier::from_parts(
            StubEngine::returning(vec![0.1, 0.2, 0.7]),
            small_preprocessor(2),
            two_class_labels(),
        );
        assert!(matches!(
            result,
            Err(ClassifyError::LabelMapping {
                labels: 2,
                scores: 3
            })
        ));
    }

    #[test]
    fn engine_failure_propagates_without_a_result() {
        let classifier = LeafClassifier::from_parts(
            FailingEngine,
            small_preprocessor(2),
            two_class_labels(),
        )
        .unwrap();
        let image = RawImage::new(2, 2, vec![0; 4]).unwrap();
        assert!(matches!(
            classifier.classify(&image),
            Err(ClassifyError::Inference { .. })
        ));
    }

    #[test]
    fn non_square_capture_fails_before_inference() {
        let classifier = LeafClassifier::from_parts(
            FailingEngine,
            small_preprocessor(2),
            two_class_labels(),
        )
        .unwrap();
        let image = RawImage::new(4, 2, vec![0; 8]).unwrap();
        // Preprocess rejects first; the failing engine is never reached.
        assert!(matches!(
            classifier.classify(&image),
            Err(ClassifyError::Preprocess { .. })
        ));
    }

    #[test]
    fn top_k_runs_through_the_pipeline() {
        let classifier = LeafClassifier::from_parts(
            StubEngine::returning(vec![0.6, 0.3, 0.1]),
            small_preprocessor(2),
            LabelTable::new(vec!["a".into(), "b".into(), "c".into()]).unwrap(),
        )
        .unwrap();
        let image = RawImage::new(2, 2, vec![0; 4]).unwrap();

        let results = classifier.classify_top_k(&image, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].class_index, 0);
        assert_eq!(results[1].class_index, 1);
    }

    #[test]
    fn config_parses_from_json_with_defaults() {
        let config =
            PipelineConfig::from_json(r#"{"model_path": "models/plant_disease.onnx"}"#).unwrap();
        assert_eq!(config.target_size, DEFAULT_TARGET_SIZE);
        assert_eq!(config.resize_filter, ResizeFilter::Nearest);
        assert!(config.ort_session.is_none());

        let invalid = PipelineConfig::from_json("{}");
        assert!(matches!(invalid, Err(ClassifyError::Config { .. })));
    }
}
