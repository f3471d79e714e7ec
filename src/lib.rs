//! # leafscan
//!
//! On-device plant-leaf disease classification over ONNX models. The crate
//! turns a captured photograph into the `[1, S, S, 3]` float tensor a
//! classification model expects, runs inference through ONNX Runtime, and
//! decodes the confidence vector into one of 38 disease/health labels across
//! 14 plant species.
//!
//! ## Components
//!
//! - **Preprocessor**: packed-pixel capture to resampled, unit-normalized,
//!   channel-last tensor
//! - **Inference adapter**: a loaded ONNX session behind a serializing mutex
//! - **Decoder**: deterministic arg-max (plus top-k) against the label table
//! - **Worker**: a background thread so interactive callers never block on a
//!   model invocation
//!
//! ## Modules
//!
//! * [`core`] - errors, configuration, and the ONNX inference adapter
//! * [`domain`] - input images, label tables, classification results
//! * [`processors`] - preprocessing and confidence decoding
//! * [`pipeline`] - the classifier, its builder, and the background worker
//! * [`utils`] - capture-boundary helpers (file loading, square cropping)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use leafscan::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier =
//!     LeafClassifier::from_config(&PipelineConfig::new("models/plant_disease.onnx"))?;
//!
//! let capture = leafscan::utils::load_image(std::path::Path::new("capture.jpg"))?;
//! let capture = leafscan::utils::center_crop_square(&capture);
//!
//! let result = classifier.classify(&capture)?;
//! println!("{} (score {:.3})", result.label, result.confidence);
//! # Ok(())
//! # }
//! ```
//!
//! ## Off the interactive thread
//!
//! ```rust,no_run
//! use leafscan::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier =
//!     LeafClassifier::from_config(&PipelineConfig::new("models/plant_disease.onnx"))?;
//! let worker = ClassifierWorker::spawn(classifier);
//!
//! let capture = leafscan::utils::load_image(std::path::Path::new("capture.jpg"))?;
//! let pending = worker.submit(capture);
//! // ... keep servicing the UI; block only when the result is needed.
//! let result = pending.wait()?;
//! println!("{}", result.label);
//! # Ok(())
//! # }
//! ```
//!
//! ## JSON configuration
//!
//! ```rust
//! use leafscan::pipeline::PipelineConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_json(
//!     r#"{
//!         "model_path": "models/plant_disease.onnx",
//!         "target_size": 224,
//!         "resize_filter": "Bilinear",
//!         "ort_session": { "intra_threads": 2 }
//!     }"#,
//! )?;
//! assert_eq!(config.target_size, 224);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use leafscan::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{ClassifyError, ClassifyResult, InferenceEngine, OrtInfer};
    pub use crate::domain::{ClassificationResult, ConfidenceVector, LabelTable, RawImage};
    pub use crate::pipeline::{
        ClassifierWorker, LeafClassifier, LeafClassifierBuilder, PendingClassification,
        PipelineConfig,
    };
}
