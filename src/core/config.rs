//! Configuration types for the ONNX Runtime session and preprocessing.

use serde::{Deserialize, Serialize};

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    #[default]
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
    /// Enable all optimizations (alias for Level3).
    All,
}

/// Execution providers for ONNX Runtime.
///
/// On-device classification targets the CPU provider; CUDA is available behind
/// the `cuda` feature for bench rigs with a discrete GPU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum OrtExecutionProvider {
    /// CPU execution provider (always available).
    #[default]
    CPU,
    /// NVIDIA CUDA execution provider.
    CUDA {
        /// CUDA device ID (default: 0).
        device_id: Option<i32>,
    },
}

/// Configuration for the ONNX Runtime session backing a classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes.
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes.
    pub inter_threads: Option<usize>,
    /// Enable parallel execution mode.
    pub parallel_execution: Option<bool>,
    /// Graph optimization level.
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
    /// Execution providers in order of preference.
    pub execution_providers: Option<Vec<OrtExecutionProvider>>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallel_execution(mut self, enabled: bool) -> Self {
        self.parallel_execution = Some(enabled);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }

    /// Sets the execution providers.
    pub fn with_execution_providers(mut self, providers: Vec<OrtExecutionProvider>) -> Self {
        self.execution_providers = Some(providers);
        self
    }

    /// Adds a single execution provider.
    pub fn add_execution_provider(mut self, provider: OrtExecutionProvider) -> Self {
        if let Some(ref mut providers) = self.execution_providers {
            providers.push(provider);
        } else {
            self.execution_providers = Some(vec![provider]);
        }
        self
    }
}

/// Resampling filter used when scaling a capture to the model input size.
///
/// Shape and normalization are the pipeline contract; the filter only affects
/// which pixels survive the scale. Nearest matches the reference system's
/// capture scaling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeFilter {
    /// Nearest-neighbor sampling.
    #[default]
    Nearest,
    /// Bilinear interpolation.
    Bilinear,
    /// Catmull-Rom cubic interpolation.
    CatmullRom,
    /// Lanczos windowed sinc, 3-lobe.
    Lanczos3,
}

impl ResizeFilter {
    pub(crate) fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            Self::Nearest => image::imageops::FilterType::Nearest,
            Self::Bilinear => image::imageops::FilterType::Triangle,
            Self::CatmullRom => image::imageops::FilterType::CatmullRom,
            Self::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}
