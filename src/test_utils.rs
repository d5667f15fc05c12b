//! Test utilities for matting-dataset
//!
//! This module provides common rasters for testing the sample pipeline.
//! It is only compiled when running tests.

use image::{Luma, Rgb};
use imageproc::definitions::Image;

/// Creates a test RGB image with predefined pixel values for testing.
///
/// This function creates a 2x2 test image with known pixel values:
/// - (0,0): [200, 150, 100]
/// - (1,0): [100, 200, 150]
/// - (0,1): [150, 100, 200]
/// - (1,1): [50, 75, 25]
pub fn create_test_rgb_image() -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgb([200, 150, 100]));
    image.put_pixel(1, 0, Rgb([100, 200, 150]));
    image.put_pixel(0, 1, Rgb([150, 100, 200]));
    image.put_pixel(1, 1, Rgb([50, 75, 25]));
    image
}

/// Replicates a single-channel matte into the three-channel layout mattes
/// are stored in on disk.
pub fn gray_to_rgb(alpha: &Image<Luma<u8>>) -> Image<Rgb<u8>> {
    Image::from_fn(alpha.width(), alpha.height(), |x, y| {
        let v = alpha.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_rgb_image_with_valid_input_creates_image() {
        let image = create_test_rgb_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgb([200, 150, 100]));
        assert_eq!(image.get_pixel(1, 1), &Rgb([50, 75, 25]));
    }

    #[test]
    fn gray_to_rgb_replicates_channel() {
        let alpha: Image<Luma<u8>> = Image::from_raw(2, 1, vec![7, 200]).unwrap();
        let rgb = gray_to_rgb(&alpha);
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([200, 200, 200]));
    }
}
