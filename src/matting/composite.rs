//! Alpha compositing of a foreground over an unrelated background.

use image::{ImageBuffer, Luma, Rgb};
use imageproc::definitions::Image;
use itertools::izip;

use crate::error::CompositeError;
use crate::matting::config::CropSize;
use crate::matting::inter_linear::ResizeLinearExt;
use crate::utils::normalize_alpha_with_max;

/// Trait providing `I = a * F + (1 - a) * B` blending
pub trait AlphaBlendExt {
    /// Blends `self` as foreground over `background` using `alpha`.
    ///
    /// The matte is stored with three channels; each colour channel is
    /// weighted by the matching alpha channel scaled to `[0, 1]`. The result
    /// keeps full floating-point precision.
    ///
    /// # Errors
    ///
    /// * `CompositeError::DimensionMismatch` - When alpha or background size differs from `self`
    /// * `CompositeError::EmptyImage` - When the foreground has no pixels
    fn alpha_blend(
        &self,
        alpha: &Image<Rgb<u8>>,
        background: &Image<Rgb<u8>>,
    ) -> Result<Image<Rgb<f32>>, CompositeError>;
}

impl AlphaBlendExt for Image<Rgb<u8>> {
    fn alpha_blend(
        &self,
        alpha: &Image<Rgb<u8>>,
        background: &Image<Rgb<u8>>,
    ) -> Result<Image<Rgb<f32>>, CompositeError> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Err(CompositeError::EmptyImage);
        }
        validate_dimensions(self, alpha)?;
        validate_dimensions(self, background)?;

        let max = f32::from(u8::MAX);
        let data = izip!(self.pixels(), alpha.pixels(), background.pixels())
            .flat_map(|(fg, a, bg)| {
                let mut out = [0.0f32; 3];
                for (c, value) in out.iter_mut().enumerate() {
                    let weight = normalize_alpha_with_max(a[c], max);
                    *value = weight * f32::from(fg[c]) + (1.0 - weight) * f32::from(bg[c]);
                }
                out
            })
            .collect();

        ImageBuffer::from_raw(width, height, data).ok_or(CompositeError::EmptyImage)
    }
}

/// Result of compositing one foreground/background pair.
#[derive(Debug, Clone)]
pub struct Composite {
    pub image: Image<Rgb<f32>>,
    /// First channel of the (possibly upsampled) matte
    pub alpha: Image<Luma<u8>>,
    pub foreground: Image<Rgb<u8>>,
    /// Background resampled to the foreground size
    pub background: Image<Rgb<u8>>,
    /// Isotropic upsampling factor applied to foreground and alpha, if any
    pub upsample_ratio: Option<f64>,
    /// Whether the three matte channels agreed everywhere
    pub alpha_channels_agree: bool,
}

/// Size foreground and alpha must be upsampled to so that `crop` fits.
///
/// Returns `None` when the raster already covers the crop or has a zero
/// side. Otherwise both
/// axes are scaled by `max((crop_h + 1) / h, (crop_w + 1) / w)` and
/// truncated, which leaves at least one spare pixel on the tighter axis.
pub fn upsampled_size(width: u32, height: u32, crop: CropSize) -> Option<(u32, u32, f64)> {
    if width == 0 || height == 0 || (height >= crop.height && width >= crop.width) {
        return None;
    }
    let ratio = f64::max(
        f64::from(crop.height + 1) / f64::from(height),
        f64::from(crop.width + 1) / f64::from(width),
    );
    let new_width = (f64::from(width) * ratio) as u32;
    let new_height = (f64::from(height) * ratio) as u32;
    Some((new_width, new_height, ratio))
}

/// Composites `foreground` over `background` for a sample that will be
/// cropped to `crop`.
///
/// Foreground and alpha are upsampled first when they are smaller than the
/// crop; the background is then resampled to the foreground size.
pub fn composite_for_crop(
    foreground: Image<Rgb<u8>>,
    alpha: Image<Rgb<u8>>,
    background: &Image<Rgb<u8>>,
    crop: CropSize,
) -> Result<Composite, CompositeError> {
    validate_dimensions(&foreground, &alpha)?;
    let (width, height) = foreground.dimensions();
    if width == 0 || height == 0 {
        return Err(CompositeError::EmptyImage);
    }

    let (foreground, alpha, upsample_ratio) = match upsampled_size(width, height, crop) {
        Some((new_width, new_height, ratio)) => {
            log::debug!(
                "upsampling {}x{} by {:.4} to {}x{} for crop {}x{}",
                width,
                height,
                ratio,
                new_width,
                new_height,
                crop.width,
                crop.height
            );
            (
                foreground.resize_linear(new_width, new_height)?,
                alpha.resize_linear(new_width, new_height)?,
                Some(ratio),
            )
        }
        None => (foreground, alpha, None),
    };

    let (width, height) = foreground.dimensions();
    let background = background.resize_linear(width, height)?;
    let image = foreground.alpha_blend(&alpha, &background)?;
    let (alpha, alpha_channels_agree) = first_channel(&alpha);

    Ok(Composite {
        image,
        alpha,
        foreground,
        background,
        upsample_ratio,
        alpha_channels_agree,
    })
}

/// Takes the first channel of a three-channel matte.
///
/// Also reports whether all three channels held the same value everywhere.
pub fn first_channel(alpha: &Image<Rgb<u8>>) -> (Image<Luma<u8>>, bool) {
    let agree = alpha.pixels().all(|Rgb([r, g, b])| r == g && g == b);
    let reduced = ImageBuffer::from_fn(alpha.width(), alpha.height(), |x, y| {
        Luma([alpha.get_pixel(x, y)[0]])
    });
    (reduced, agree)
}

#[inline]
fn validate_dimensions<P, Q>(image: &Image<P>, other: &Image<Q>) -> Result<(), CompositeError>
where
    P: image::Pixel,
    Q: image::Pixel,
{
    let expected = image.dimensions();
    let actual = other.dimensions();
    if expected == actual {
        Ok(())
    } else {
        Err(CompositeError::DimensionMismatch { expected, actual })
    }
}
