//! Internal utility functions for matting-dataset.
//!
//! This module contains numeric helpers shared by the raster operations.

use image::Primitive;
use imageproc::definitions::Clamp;

/// Subpixel types that can be written back from an interpolated `f32`.
///
/// Integer types round to nearest and saturate, float types keep the value
/// unchanged.
pub trait FromInterpolated: Primitive + Into<f32> {
    fn from_interpolated(value: f32) -> Self;
}

impl FromInterpolated for u8 {
    #[inline]
    fn from_interpolated(value: f32) -> Self {
        <u8 as Clamp<f32>>::clamp(value.round())
    }
}

impl FromInterpolated for u16 {
    #[inline]
    fn from_interpolated(value: f32) -> Self {
        <u16 as Clamp<f32>>::clamp(value.round())
    }
}

impl FromInterpolated for f32 {
    #[inline]
    fn from_interpolated(value: f32) -> Self {
        value
    }
}

/// Rounds half to even and saturates a value into the `u8` range.
#[inline]
pub fn saturate_u8(value: f32) -> u8 {
    <u8 as Clamp<f32>>::clamp(value.round_ties_even())
}

/// Normalizes an alpha value using a pre-computed max value.
///
/// # Arguments
///
/// * `alpha` - The alpha value to normalize
/// * `max_value` - The pre-computed maximum value for the type
///
/// # Returns
///
/// The normalized alpha value as a floating-point number between 0 and 1
#[inline]
pub fn normalize_alpha_with_max<S>(alpha: S, max_value: f32) -> f32
where
    S: Into<f32> + Primitive,
{
    alpha.into() / max_value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_alpha_with_max() {
        assert_eq!(normalize_alpha_with_max(0u8, 255.0), 0.0);
        assert_eq!(normalize_alpha_with_max(127u8, 255.0), 127.0 / 255.0);
        assert_eq!(normalize_alpha_with_max(255u8, 255.0), 1.0);
    }

    #[test]
    fn test_from_interpolated() {
        assert_eq!(u8::from_interpolated(-10.0), 0);
        assert_eq!(u8::from_interpolated(127.4), 127);
        assert_eq!(u8::from_interpolated(127.6), 128);
        assert_eq!(u8::from_interpolated(300.0), 255);
        assert_eq!(u16::from_interpolated(70000.0), 65535);
        assert_eq!(f32::from_interpolated(12.25), 12.25);
    }

    #[test]
    fn test_saturate_u8() {
        assert_eq!(saturate_u8(-1.0), 0);
        assert_eq!(saturate_u8(254.6), 255);
        assert_eq!(saturate_u8(1000.0), 255);
        assert_eq!(saturate_u8(2.5), 2);
        assert_eq!(saturate_u8(3.5), 4);
    }
}
