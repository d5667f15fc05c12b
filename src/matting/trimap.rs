//! Trimap synthesis from an alpha matte.
//!
//! A trimap labels every pixel as definite background (0), unknown (128) or
//! definite foreground (255). The unknown band is produced by dilating the
//! matte with a randomly sized elliptical element, so repeated draws over the
//! same matte give bands of different widths.

use std::ops::Range;

use image::Luma;
use imageproc::definitions::Image;
use imageproc::map::map_colors2;
use rand::Rng;

use crate::matting::dilate::{DilateExt, StructuringElement};

/// Label for definite background.
pub const TRIMAP_BACKGROUND: u8 = 0;
/// Label for the unknown band.
pub const TRIMAP_UNKNOWN: u8 = 128;
/// Label for definite foreground.
pub const TRIMAP_FOREGROUND: u8 = 255;

/// Single-channel raster holding only the three trimap labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trimap(Image<Luma<u8>>);

impl Trimap {
    /// Wraps a raster after checking every value is a trimap label.
    ///
    /// Returns `None` when any pixel holds another value.
    pub fn from_labels(image: Image<Luma<u8>>) -> Option<Self> {
        image
            .pixels()
            .all(|Luma([v])| matches!(*v, TRIMAP_BACKGROUND | TRIMAP_UNKNOWN | TRIMAP_FOREGROUND))
            .then_some(Self(image))
    }

    pub fn as_image(&self) -> &Image<Luma<u8>> {
        &self.0
    }

    pub fn into_image(self) -> Image<Luma<u8>> {
        self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// Coordinates `(x, y)` of every unknown pixel in row-major order.
    pub fn unknown_pixels(&self) -> Vec<(u32, u32)> {
        self.0
            .enumerate_pixels()
            .filter(|(_, _, Luma([v]))| *v == TRIMAP_UNKNOWN)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    /// Wraps labels produced by cropping or mirroring an existing trimap.
    ///
    /// Only label-preserving operations may feed this; anything that
    /// interpolates would break the three-label invariant.
    pub(crate) fn from_labels_unchecked(image: Image<Luma<u8>>) -> Self {
        Self(image)
    }
}

/// Fixed dilation parameters for one trimap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimapParams {
    /// Side length of the elliptical structuring element
    pub kernel_size: u32,
    /// Number of dilation passes
    pub iterations: u32,
}

impl Default for TrimapParams {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            iterations: 10,
        }
    }
}

/// Randomized trimap generator.
///
/// Kernel size and iteration count are drawn independently on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimapGenerator {
    kernel_sizes: Range<u32>,
    iterations: Range<u32>,
}

impl Default for TrimapGenerator {
    fn default() -> Self {
        Self {
            kernel_sizes: 1..5,
            iterations: 1..20,
        }
    }
}

impl TrimapGenerator {
    /// Generator drawing from custom half-open ranges.
    ///
    /// Empty ranges collapse to their start value.
    pub fn with_ranges(kernel_sizes: Range<u32>, iterations: Range<u32>) -> Self {
        Self {
            kernel_sizes,
            iterations,
        }
    }

    /// Draws dilation parameters.
    pub fn draw_params<R: Rng + ?Sized>(&self, rng: &mut R) -> TrimapParams {
        TrimapParams {
            kernel_size: draw_from(&self.kernel_sizes, rng),
            iterations: draw_from(&self.iterations, rng),
        }
    }

    /// Generates a trimap with freshly drawn parameters.
    pub fn generate<R: Rng + ?Sized>(&self, alpha: &Image<Luma<u8>>, rng: &mut R) -> Trimap {
        let params = self.draw_params(rng);
        log::trace!(
            "trimap kernel={} iterations={}",
            params.kernel_size,
            params.iterations
        );
        Self::generate_with(alpha, params)
    }

    /// Generates a trimap with fixed parameters.
    ///
    /// Pixels with alpha 255 become foreground, pixels whose dilated alpha is
    /// 0 become background, the rest is unknown. The background rule wins
    /// when both apply, which cannot happen since dilation never lowers a
    /// value.
    pub fn generate_with(alpha: &Image<Luma<u8>>, params: TrimapParams) -> Trimap {
        let element = StructuringElement::ellipse(params.kernel_size);
        let dilated = alpha.dilate(&element, params.iterations);

        let labels = map_colors2(alpha, &dilated, |Luma([raw]), Luma([grown])| {
            let label = if grown == 0 {
                TRIMAP_BACKGROUND
            } else if raw == u8::MAX {
                TRIMAP_FOREGROUND
            } else {
                TRIMAP_UNKNOWN
            };
            Luma([label])
        });

        Trimap(labels)
    }
}

fn draw_from<R: Rng + ?Sized>(range: &Range<u32>, rng: &mut R) -> u32 {
    if range.is_empty() {
        range.start
    } else {
        rng.random_range(range.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn disc_alpha() -> Image<Luma<u8>> {
        ImageBuffer::from_fn(16, 16, |x, y| {
            let d = (x as f32 - 7.5).hypot(y as f32 - 7.5);
            if d < 3.0 {
                Luma([255])
            } else if d < 5.0 {
                Luma([120])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn generate_with_labels_opaque_partial_and_empty_pixels() {
        let alpha = disc_alpha();
        let trimap = TrimapGenerator::generate_with(
            &alpha,
            TrimapParams {
                kernel_size: 3,
                iterations: 1,
            },
        );
        let labels = trimap.as_image();

        assert_eq!(labels.get_pixel(7, 7)[0], TRIMAP_FOREGROUND);
        assert_eq!(labels.get_pixel(7, 11)[0], TRIMAP_UNKNOWN);
        assert_eq!(labels.get_pixel(0, 0)[0], TRIMAP_BACKGROUND);
    }

    #[test]
    fn generate_with_grows_unknown_band_with_iterations() {
        let alpha = disc_alpha();
        let narrow = TrimapGenerator::generate_with(
            &alpha,
            TrimapParams {
                kernel_size: 3,
                iterations: 1,
            },
        );
        let wide = TrimapGenerator::generate_with(
            &alpha,
            TrimapParams {
                kernel_size: 3,
                iterations: 3,
            },
        );
        assert!(wide.unknown_pixels().len() > narrow.unknown_pixels().len());
    }

    #[test]
    fn generate_on_all_zero_alpha_is_background() {
        let alpha: Image<Luma<u8>> = Image::new(8, 8);
        let mut rng = StdRng::seed_from_u64(3);
        let trimap = TrimapGenerator::default().generate(&alpha, &mut rng);
        assert!(trimap.as_image().pixels().all(|p| p[0] == TRIMAP_BACKGROUND));
        assert!(trimap.unknown_pixels().is_empty());
    }

    #[test]
    fn generate_on_all_opaque_alpha_is_foreground() {
        let alpha: Image<Luma<u8>> = ImageBuffer::from_pixel(8, 8, Luma([255]));
        let mut rng = StdRng::seed_from_u64(4);
        let trimap = TrimapGenerator::default().generate(&alpha, &mut rng);
        assert!(trimap.as_image().pixels().all(|p| p[0] == TRIMAP_FOREGROUND));
    }

    #[test]
    fn draw_params_stay_in_range() {
        let generator = TrimapGenerator::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let params = generator.draw_params(&mut rng);
            assert!((1..5).contains(&params.kernel_size));
            assert!((1..20).contains(&params.iterations));
        }
    }

    #[test]
    fn draw_params_with_empty_range_uses_start() {
        let generator = TrimapGenerator::with_ranges(3..3, 7..7);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generator.draw_params(&mut rng),
            TrimapParams {
                kernel_size: 3,
                iterations: 7
            }
        );
    }

    #[test]
    fn from_labels_rejects_other_values() {
        let ok: Image<Luma<u8>> = ImageBuffer::from_raw(3, 1, vec![0, 128, 255]).unwrap();
        assert!(Trimap::from_labels(ok).is_some());
        let bad: Image<Luma<u8>> = ImageBuffer::from_raw(3, 1, vec![0, 127, 255]).unwrap();
        assert!(Trimap::from_labels(bad).is_none());
    }

    #[test]
    fn unknown_pixels_are_row_major() {
        let labels: Image<Luma<u8>> =
            ImageBuffer::from_raw(3, 2, vec![128, 0, 255, 0, 128, 128]).unwrap();
        let trimap = Trimap::from_labels(labels).unwrap();
        assert_eq!(trimap.unknown_pixels(), vec![(0, 0), (1, 1), (2, 1)]);
    }
}
