//! Image preprocessing: resampling and tensor normalization.
//!
//! Converts a square capture into the `[1, S, S, 3]` channel-last float tensor
//! a classification model consumes. `ndarray` stores `f32` elements in native
//! byte order, which is the layout the runtime expects on the same device.

use image::imageops;
use ndarray::Array4;
use rayon::prelude::*;

use crate::core::Tensor4D;
use crate::core::config::ResizeFilter;
use crate::core::errors::ClassifyError;
use crate::domain::RawImage;

/// Per-channel linear pixel transform `value * alpha + beta`, with
/// `alpha = scale / std` and `beta = -mean / std`.
///
/// The default is unit-interval normalization (`scale = 1/255`, zero mean,
/// unit std), mapping every 8-bit channel into `[0.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct Normalizer {
    alpha: [f32; 3],
    beta: [f32; 3],
}

impl Normalizer {
    /// Creates a normalizer from scale, per-channel mean, and per-channel std.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Config`] when scale or any std is not
    /// positive.
    pub fn new(scale: f32, mean: [f32; 3], std: [f32; 3]) -> Result<Self, ClassifyError> {
        if scale <= 0.0 {
            return Err(ClassifyError::config_error(format!(
                "normalization scale must be greater than 0, got {scale}"
            )));
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(ClassifyError::config_error(format!(
                    "standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }
        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            alpha[c] = scale / std[c];
            beta[c] = -mean[c] / std[c];
        }
        Ok(Self { alpha, beta })
    }

    /// Unit-interval normalization: every channel becomes `value / 255.0`.
    pub fn unit() -> Self {
        Self {
            alpha: [1.0 / 255.0; 3],
            beta: [0.0; 3],
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::unit()
    }
}

/// Converts a square [`RawImage`] into the model input tensor.
///
/// The capture collaborator is responsible for square-cropping; this component
/// validates the constraint and rejects rectangles.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    target_size: u32,
    filter: ResizeFilter,
    normalizer: Normalizer,
}

impl Preprocessor {
    /// Creates a preprocessor producing `[1, target_size, target_size, 3]`
    /// tensors.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Config`] when `target_size` is zero.
    pub fn new(
        target_size: u32,
        filter: ResizeFilter,
        normalizer: Normalizer,
    ) -> Result<Self, ClassifyError> {
        if target_size == 0 {
            return Err(ClassifyError::config_error(
                "preprocessor target size must be positive",
            ));
        }
        Ok(Self {
            target_size,
            filter,
            normalizer,
        })
    }

    /// The edge length of produced tensors.
    pub fn target_size(&self) -> u32 {
        self.target_size
    }

    /// Converts a square capture into a normalized `[1, S, S, 3]` tensor.
    ///
    /// Pixels are visited in row-major order; each contributes its red, green,
    /// and blue channels contiguously (channel-last), alpha discarded. With
    /// the default [`Normalizer`] every output value lies in `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Preprocess`] when the image is not square.
    /// Positive dimensions and a consistent pixel buffer are already
    /// guaranteed by [`RawImage`] construction.
    pub fn run(&self, image: &RawImage) -> Result<Tensor4D, ClassifyError> {
        if !image.is_square() {
            return Err(ClassifyError::preprocess(format!(
                "expected a square image, got {}x{}; crop before classification",
                image.width(),
                image.height()
            )));
        }

        let size = self.target_size;
        let rgb = image.to_rgb();
        let resized = if rgb.dimensions() == (size, size) {
            rgb
        } else {
            imageops::resize(&rgb, size, size, self.filter.to_image_filter())
        };

        let side = size as usize;
        let alpha = self.normalizer.alpha;
        let beta = self.normalizer.beta;
        let mut buffer = vec![0.0f32; side * side * 3];
        buffer
            .par_chunks_mut(side * 3)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..side {
                    let pixel = resized.get_pixel(x as u32, y as u32);
                    for c in 0..3 {
                        row[x * 3 + c] = f32::from(pixel[c]) * alpha[c] + beta[c];
                    }
                }
            });

        Ok(Array4::from_shape_vec((1, side, side, 3), buffer)?)
    }
}
