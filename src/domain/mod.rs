//! Domain types: input images, label tables, and classification results.

pub mod labels;

pub use labels::LabelTable;

use image::RgbImage;

use crate::core::errors::ClassifyError;

/// Raw per-class scores produced by a model, one entry per class.
///
/// Not guaranteed to sum to 1 (whether the model's final layer normalizes is a
/// property of the artifact, not of this crate); treat entries as relative
/// magnitudes, not probabilities.
pub type ConfidenceVector = Vec<f32>;

/// A decoded capture handed over by the camera/gallery collaborator.
///
/// Pixels are packed `0xAARRGGBB` values in row-major order, one per pixel.
/// The alpha byte may be absent or garbage; the pipeline ignores it. The
/// buffer length invariant (`pixels.len() == width * height`) is enforced at
/// construction, so a `RawImage` in hand is always internally consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl RawImage {
    /// Creates an image from dimensions and a packed pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Preprocess`] when either dimension is zero or
    /// the buffer length does not equal `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, ClassifyError> {
        if width == 0 || height == 0 {
            return Err(ClassifyError::preprocess(format!(
                "image dimensions must be positive, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ClassifyError::preprocess(format!(
                "pixel buffer holds {} values but {width}x{height} needs {expected}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Internal constructor for buffers whose invariants already hold.
    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether width equals height.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// The packed pixel buffer, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// The packed value of the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is outside the image.
    pub fn pixel_at(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Red, green, and blue channels of the pixel at (x, y); alpha bits are
    /// ignored.
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let value = self.pixel_at(x, y);
        (
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        )
    }

    /// Packs an 8-bit RGB image into a `RawImage` with opaque alpha.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|pixel| {
                0xFF00_0000u32
                    | (u32::from(pixel[0]) << 16)
                    | (u32::from(pixel[1]) << 8)
                    | u32::from(pixel[2])
            })
            .collect();
        Self::from_parts(width, height, pixels)
    }

    /// Unpacks into an 8-bit RGB image, discarding alpha.
    pub fn to_rgb(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let (r, g, b) = self.rgb_at(x, y);
            image::Rgb([r, g, b])
        })
    }
}

/// The outcome of classifying one capture. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// Index of the winning class in the label table.
    pub class_index: usize,
    /// Canonical label text for the winning class.
    pub label: String,
    /// Raw score of the winning class. Uncalibrated: comparable to the other
    /// entries of the same confidence vector, not a probability.
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            RawImage::new(0, 4, vec![]),
            Err(ClassifyError::Preprocess { .. })
        ));
        assert!(matches!(
            RawImage::new(4, 0, vec![]),
            Err(ClassifyError::Preprocess { .. })
        ));
    }

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(matches!(
            RawImage::new(2, 2, vec![0; 3]),
            Err(ClassifyError::Preprocess { .. })
        ));
    }

    #[test]
    fn unpacks_channels_and_ignores_alpha() {
        let image = RawImage::new(1, 1, vec![0x12AB_CDEF]).unwrap();
        assert_eq!(image.rgb_at(0, 0), (0xAB, 0xCD, 0xEF));
    }

    #[test]
    fn rgb_round_trip_preserves_channels() {
        let mut rgb = RgbImage::new(2, 2);
        rgb.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        rgb.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        rgb.put_pixel(1, 1, image::Rgb([10, 20, 30]));

        let raw = RawImage::from_rgb(&rgb);
        assert_eq!(raw.rgb_at(1, 1), (10, 20, 30));
        assert_eq!(raw.to_rgb(), rgb);
    }
}
