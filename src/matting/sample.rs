//! Packaging of final rasters into channel-first tensors.

use std::path::PathBuf;

use image::{Luma, Pixel, Primitive, Rgb};
use imageproc::definitions::Image;
use ndarray::{concatenate, Array3, Axis, ShapeError};

use crate::matting::gradient::GradientMap;
use crate::matting::trimap::Trimap;

/// `(height, width, channels)` of a decoded source raster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RasterShape {
    pub height: u32,
    pub width: u32,
    pub channels: u8,
}

impl RasterShape {
    pub fn of_rgb<S>(image: &Image<Rgb<S>>) -> Self
    where
        S: Primitive,
        Rgb<S>: Pixel<Subpixel = S>,
    {
        Self {
            height: image.height(),
            width: image.width(),
            channels: 3,
        }
    }
}

/// Files a sample was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourcePaths {
    pub foreground: PathBuf,
    pub alpha: PathBuf,
    pub background: PathBuf,
    /// Pre-composited image, offline samples only
    pub composite: Option<PathBuf>,
}

/// Where a sample came from, for debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Provenance {
    pub sources: SourcePaths,
    /// Foreground shape as decoded, before any resampling
    pub foreground_shape: RasterShape,
    /// Background shape as decoded, before any resampling
    pub background_shape: RasterShape,
}

/// Final-resolution rasters of one sample.
#[derive(Debug, Clone)]
pub struct AssembledRasters {
    pub image: Image<Rgb<f32>>,
    pub alpha: Image<Luma<u8>>,
    pub foreground: Image<Rgb<u8>>,
    pub background: Image<Rgb<u8>>,
    pub trimap: Trimap,
    pub gradient: GradientMap,
}

impl AssembledRasters {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Converts every raster to an `f32` tensor.
    pub fn into_sample(self, provenance: Provenance) -> MattingSample {
        MattingSample {
            image: rgb_to_chw(&self.image),
            alpha: luma_to_chw(&self.alpha),
            foreground: rgb_to_chw(&self.foreground),
            background: rgb_to_chw(&self.background),
            trimap: luma_to_chw(self.trimap.as_image()),
            gradient: luma_to_chw(self.gradient.as_image()),
            provenance,
        }
    }
}

/// One training sample as consumed by the model.
///
/// Colour tensors are `3 x H x W`, single-channel tensors `1 x H x W`. Values
/// keep the 0-255 scale of the source rasters.
#[derive(Debug, Clone, PartialEq)]
pub struct MattingSample {
    pub image: Array3<f32>,
    pub alpha: Array3<f32>,
    pub foreground: Array3<f32>,
    pub background: Array3<f32>,
    pub trimap: Array3<f32>,
    pub gradient: Array3<f32>,
    pub provenance: Provenance,
}

impl MattingSample {
    /// Image and trimap stacked into the `4 x H x W` network input.
    pub fn network_input(&self) -> Result<Array3<f32>, ShapeError> {
        concatenate(Axis(0), &[self.image.view(), self.trimap.view()])
    }
}

/// Converts an RGB raster to a `3 x H x W` tensor.
pub fn rgb_to_chw<S>(image: &Image<Rgb<S>>) -> Array3<f32>
where
    S: Primitive + Into<f32>,
    Rgb<S>: Pixel<Subpixel = S>,
{
    let (width, height) = image.dimensions();
    Array3::from_shape_fn((3, height as usize, width as usize), |(c, y, x)| {
        image.get_pixel(x as u32, y as u32).channels()[c].into()
    })
}

/// Converts a single-channel raster to a `1 x H x W` tensor.
pub fn luma_to_chw(image: &Image<Luma<u8>>) -> Array3<f32> {
    let (width, height) = image.dimensions();
    Array3::from_shape_fn((1, height as usize, width as usize), |(_, y, x)| {
        f32::from(image.get_pixel(x as u32, y as u32)[0])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_rgb_image;
    use image::ImageBuffer;

    #[test]
    fn rgb_to_chw_moves_channels_first() {
        let image = create_test_rgb_image();
        let tensor = rgb_to_chw(&image);
        assert_eq!(tensor.shape(), &[3, 2, 2]);
        // (x=1, y=0) is [100, 200, 150]
        assert_eq!(tensor[[0, 0, 1]], 100.0);
        assert_eq!(tensor[[1, 0, 1]], 200.0);
        assert_eq!(tensor[[2, 0, 1]], 150.0);
        // (x=0, y=1) is [150, 100, 200]
        assert_eq!(tensor[[2, 1, 0]], 200.0);
    }

    #[test]
    fn rgb_to_chw_keeps_float_values() {
        let image: Image<Rgb<f32>> =
            ImageBuffer::from_fn(3, 2, |x, y| Rgb([x as f32 + 0.25, y as f32, 254.5]));
        let tensor = rgb_to_chw(&image);
        assert_eq!(tensor.shape(), &[3, 2, 3]);
        assert_eq!(tensor[[0, 1, 2]], 2.25);
        assert_eq!(tensor[[1, 1, 2]], 1.0);
        assert_eq!(tensor[[2, 0, 0]], 254.5);
    }

    #[test]
    fn raster_shape_reports_height_width_channels() {
        let image: Image<Rgb<f32>> = ImageBuffer::new(5, 4);
        let shape = RasterShape::of_rgb(&image);
        assert_eq!((shape.height, shape.width, shape.channels), (4, 5, 3));
        let shape = RasterShape::of_rgb(&create_test_rgb_image());
        assert_eq!((shape.height, shape.width, shape.channels), (2, 2, 3));
    }

    #[test]
    fn luma_to_chw_adds_leading_axis() {
        let image: Image<Luma<u8>> = ImageBuffer::from_raw(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        let tensor = luma_to_chw(&image);
        assert_eq!(tensor.shape(), &[1, 2, 3]);
        assert_eq!(tensor[[0, 1, 2]], 5.0);
        assert_eq!(tensor[[0, 0, 1]], 1.0);
    }

    #[test]
    fn network_input_stacks_image_and_trimap() {
        let image: Image<Rgb<f32>> = ImageBuffer::from_pixel(2, 2, Rgb([1.0, 2.0, 3.0]));
        let labels: Image<Luma<u8>> = ImageBuffer::from_pixel(2, 2, Luma([128]));
        let sample = MattingSample {
            image: rgb_to_chw(&image),
            alpha: luma_to_chw(&labels),
            foreground: rgb_to_chw(&image),
            background: rgb_to_chw(&image),
            trimap: luma_to_chw(&labels),
            gradient: luma_to_chw(&labels),
            provenance: Provenance::default(),
        };

        let input = sample.network_input().unwrap();
        assert_eq!(input.shape(), &[4, 2, 2]);
        assert_eq!(input[[2, 1, 1]], 3.0);
        assert_eq!(input[[3, 0, 0]], 128.0);
    }
}
