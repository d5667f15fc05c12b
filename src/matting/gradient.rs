//! Edge-magnitude feature map of a composited image.

use image::{ImageBuffer, Luma, Pixel, Rgb};
use imageproc::definitions::Image;
use itertools::iproduct;

use crate::utils::saturate_u8;

/// Single-channel edge strength raster, same size as its source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientMap(Image<Luma<u8>>);

impl GradientMap {
    pub fn as_image(&self) -> &Image<Luma<u8>> {
        &self.0
    }

    pub fn into_image(self) -> Image<Luma<u8>> {
        self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }
}

/// Trait computing a Sobel gradient feature map
pub trait SobelGradientExt {
    /// Computes the gradient map.
    ///
    /// Per channel, the 3x3 horizontal and vertical Sobel responses are
    /// rounded into `i16`, rectified into `u8`, and averaged with equal
    /// weights. The three averaged channels are then converted to luminance
    /// with BT.601 weights. Borders reflect without repeating the edge pixel.
    fn sobel_gradient(&self) -> GradientMap;
}

impl SobelGradientExt for Image<Rgb<f32>> {
    fn sobel_gradient(&self) -> GradientMap {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return GradientMap(Image::new(width, height));
        }

        let gradient = ImageBuffer::from_fn(width, height, |x, y| {
            let mut mixed = [0u8; 3];
            for (c, out) in mixed.iter_mut().enumerate() {
                let (gx, gy) = sobel_at(self, x, y, c);
                let abs_x = rectify(gx);
                let abs_y = rectify(gy);
                let blended = 0.5 * f32::from(abs_x) + 0.5 * f32::from(abs_y);
                *out = saturate_u8(blended);
            }
            Luma([luminance(Rgb(mixed))])
        });

        GradientMap(gradient)
    }
}

/// Horizontal and vertical Sobel response of channel `c` at `(x, y)`.
fn sobel_at(image: &Image<Rgb<f32>>, x: u32, y: u32, c: usize) -> (f32, f32) {
    const SMOOTH: [f32; 3] = [1.0, 2.0, 1.0];
    const DERIVE: [f32; 3] = [-1.0, 0.0, 1.0];

    let (width, height) = image.dimensions();
    let mut gx = 0.0;
    let mut gy = 0.0;
    for (j, i) in iproduct!(0..3usize, 0..3usize) {
        let sx = reflect_101(x as i64 + i as i64 - 1, width);
        let sy = reflect_101(y as i64 + j as i64 - 1, height);
        let value = image.get_pixel(sx, sy).channels()[c];
        gx += DERIVE[i] * SMOOTH[j] * value;
        gy += SMOOTH[i] * DERIVE[j] * value;
    }
    (gx, gy)
}

/// Rounds a response into `i16` and returns its saturated absolute value.
#[inline]
fn rectify(response: f32) -> u8 {
    let signed = response
        .round_ties_even()
        .clamp(f32::from(i16::MIN), f32::from(i16::MAX));
    signed.abs().min(255.0) as u8
}

/// BT.601 luminance in 14-bit fixed point.
#[inline]
fn luminance(Rgb([r, g, b]): Rgb<u8>) -> u8 {
    const R_WEIGHT: u32 = 4899;
    const G_WEIGHT: u32 = 9617;
    const B_WEIGHT: u32 = 1868;
    let sum = u32::from(r) * R_WEIGHT + u32::from(g) * G_WEIGHT + u32::from(b) * B_WEIGHT;
    ((sum + (1 << 13)) >> 14) as u8
}

/// Border index mapping `gfedcb|abcdefgh|gfedcba`.
#[inline]
fn reflect_101(index: i64, len: u32) -> u32 {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_101_mirrors_without_edge_repeat() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(0, 5), 0);
        assert_eq!(reflect_101(4, 5), 4);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(-1, 1), 0);
        assert_eq!(reflect_101(1, 2), 1);
        assert_eq!(reflect_101(2, 2), 0);
    }

    #[test]
    fn luminance_of_gray_is_identity() {
        for v in [0u8, 1, 77, 128, 254, 255] {
            assert_eq!(luminance(Rgb([v, v, v])), v);
        }
    }

    #[test]
    fn rectify_saturates() {
        assert_eq!(rectify(-3.0), 3);
        assert_eq!(rectify(1000.0), 255);
        assert_eq!(rectify(-40000.0), 255);
        assert_eq!(rectify(2.5), 2);
    }

    #[test]
    fn constant_image_has_zero_gradient() {
        let image: Image<Rgb<f32>> = ImageBuffer::from_pixel(6, 5, Rgb([90.0, 10.0, 200.0]));
        let gradient = image.sobel_gradient();
        assert_eq!(gradient.dimensions(), (6, 5));
        assert!(gradient.as_image().pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn vertical_edge_responds_only_near_edge() {
        let image: Image<Rgb<f32>> = ImageBuffer::from_fn(8, 4, |x, _| {
            if x < 4 {
                Rgb([0.0, 0.0, 0.0])
            } else {
                Rgb([40.0, 40.0, 40.0])
            }
        });
        let gradient = image.sobel_gradient();

        // gx = 4 * 40 = 160, gy = 0, blended = 80, gray keeps 80
        assert_eq!(gradient.as_image().get_pixel(3, 2)[0], 80);
        assert_eq!(gradient.as_image().get_pixel(4, 2)[0], 80);
        assert_eq!(gradient.as_image().get_pixel(0, 2)[0], 0);
        assert_eq!(gradient.as_image().get_pixel(7, 2)[0], 0);
    }

    #[test]
    fn empty_image_gives_empty_gradient() {
        let image: Image<Rgb<f32>> = Image::new(0, 0);
        assert_eq!(image.sobel_gradient().dimensions(), (0, 0));
    }
}
