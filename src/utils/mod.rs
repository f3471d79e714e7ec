//! Capture-boundary helpers: file loading and square cropping.
//!
//! The pipeline itself only consumes in-memory [`RawImage`]s; these helpers
//! cover callers whose captures arrive as files or as non-square frames.

use std::path::Path;

use crate::core::errors::ClassifyError;
use crate::domain::RawImage;

/// Loads an image file into a [`RawImage`].
///
/// Any format the `image` crate decodes is accepted; the decoded pixels are
/// packed with opaque alpha.
///
/// # Errors
///
/// Returns [`ClassifyError::ImageLoad`] when the file cannot be opened or
/// decoded.
pub fn load_image(path: &Path) -> Result<RawImage, ClassifyError> {
    let decoded = image::open(path)?;
    Ok(RawImage::from_rgb(&decoded.to_rgb8()))
}

/// Extracts the centered largest square from a capture.
///
/// Mirrors the thumbnail step the capture collaborator applies before
/// classification: the shorter edge becomes the side length and the longer
/// edge is trimmed equally on both ends. Square inputs come back unchanged.
pub fn center_crop_square(image: &RawImage) -> RawImage {
    if image.is_square() {
        return image.clone();
    }
    let side = image.width().min(image.height());
    let x0 = (image.width() - side) / 2;
    let y0 = (image.height() - side) / 2;

    let mut pixels = Vec::with_capacity(side as usize * side as usize);
    for y in 0..side {
        for x in 0..side {
            pixels.push(image.pixel_at(x0 + x, y0 + y));
        }
    }
    RawImage::from_parts(side, side, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crops_landscape_to_centered_square() {
        // 5x3 frame: columns 1..=3 survive.
        let pixels: Vec<u32> = (0..15).collect();
        let image = RawImage::new(5, 3, pixels).unwrap();

        let cropped = center_crop_square(&image);
        assert_eq!((cropped.width(), cropped.height()), (3, 3));
        assert_eq!(cropped.pixels(), &[1, 2, 3, 6, 7, 8, 11, 12, 13]);
    }

    #[test]
    fn crops_portrait_to_centered_square() {
        let pixels: Vec<u32> = (0..8).collect();
        let image = RawImage::new(2, 4, pixels).unwrap();

        let cropped = center_crop_square(&image);
        assert_eq!((cropped.width(), cropped.height()), (2, 2));
        assert_eq!(cropped.pixels(), &[2, 3, 4, 5]);
    }

    #[test]
    fn square_input_is_unchanged() {
        let image = RawImage::new(2, 2, vec![9, 8, 7, 6]).unwrap();
        assert_eq!(center_crop_square(&image), image);
    }

    #[test]
    fn missing_file_is_an_image_load_error() {
        let result = load_image(Path::new("definitely/not/here.png"));
        assert!(matches!(result, Err(ClassifyError::ImageLoad(_))));
    }
}
