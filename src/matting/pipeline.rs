//! In-memory sample generation: composite, label, crop, resize, package.

use image::{Luma, Rgb};
use imageproc::definitions::Image;
use imageproc::map::map_colors;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{GeometryError, SampleError};
use crate::matting::composite::composite_for_crop;
use crate::matting::config::{CropSize, PipelineConfig};
use crate::matting::geometry::{GeometryTransform, RasterQuintet};
use crate::matting::gradient::SobelGradientExt;
use crate::matting::inter_linear::ResizeLinearExt;
use crate::matting::sample::AssembledRasters;
use crate::matting::trimap::TrimapGenerator;

/// Odd 64-bit constant used to spread worker ids across the seed space.
const WORKER_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Random generator for one worker.
///
/// Workers sharing `base_seed` but with different ids get unrelated
/// streams, and the same `(base_seed, worker_id)` always reproduces the same
/// stream.
pub fn worker_rng(base_seed: u64, worker_id: u64) -> StdRng {
    StdRng::seed_from_u64(base_seed ^ worker_id.wrapping_add(1).wrapping_mul(WORKER_SEED_STRIDE))
}

/// Stateless sample generator over decoded rasters.
///
/// All randomness comes from the generator passed to each call, so one
/// pipeline can be shared by any number of threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePipeline {
    config: PipelineConfig,
    trimaps: TrimapGenerator,
    geometry: GeometryTransform,
}

impl SamplePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let geometry = GeometryTransform::new(config.flip);
        Self {
            config,
            trimaps: TrimapGenerator::default(),
            geometry,
        }
    }

    #[must_use]
    pub fn with_trimap_generator(mut self, trimaps: TrimapGenerator) -> Self {
        self.trimaps = trimaps;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Builds a sample by compositing `foreground` over `background`.
    ///
    /// `alpha` is the three-channel matte as stored on disk and must match
    /// the foreground size; the background may have any size.
    pub fn assemble_online<R: Rng + ?Sized>(
        &self,
        foreground: Image<Rgb<u8>>,
        alpha: Image<Rgb<u8>>,
        background: &Image<Rgb<u8>>,
        rng: &mut R,
    ) -> Result<AssembledRasters, SampleError> {
        let crop = self.config.crop_sizes.choose(rng);
        log::debug!("online sample, crop {}x{}", crop.width, crop.height);

        let composite = composite_for_crop(foreground, alpha, background, crop)?;
        if !composite.alpha_channels_agree {
            log::warn!("alpha matte channels differ, using the first channel");
        }

        let trimap = self.trimaps.generate(&composite.alpha, rng);
        let quintet = RasterQuintet::new(
            composite.image,
            composite.alpha,
            composite.foreground,
            composite.background,
            trimap,
        )?;

        self.finish(&quintet, crop, rng)
    }

    /// Builds a sample from a pre-composited image and its paired rasters.
    ///
    /// All four rasters must share one size.
    pub fn assemble_offline<R: Rng + ?Sized>(
        &self,
        image: Image<Rgb<u8>>,
        alpha: Image<Luma<u8>>,
        foreground: Image<Rgb<u8>>,
        background: Image<Rgb<u8>>,
        rng: &mut R,
    ) -> Result<AssembledRasters, SampleError> {
        let expected = foreground.dimensions();
        for (name, actual) in [
            ("image", image.dimensions()),
            ("alpha", alpha.dimensions()),
            ("background", background.dimensions()),
        ] {
            if actual != expected {
                return Err(GeometryError::NotCoRegistered {
                    name,
                    expected,
                    actual,
                }
                .into());
            }
        }

        let crop = self.config.crop_sizes.choose(rng);
        log::debug!("offline sample, crop {}x{}", crop.width, crop.height);

        let (width, height) = expected;
        let (image, alpha, foreground, background) = match offline_upsampled_size(width, height, crop)
        {
            Some((new_width, new_height)) => (
                image.resize_linear(new_width, new_height)?,
                alpha.resize_linear(new_width, new_height)?,
                foreground.resize_linear(new_width, new_height)?,
                background.resize_linear(new_width, new_height)?,
            ),
            None => (image, alpha, foreground, background),
        };

        let image = map_colors(&image, |Rgb([r, g, b])| {
            Rgb([f32::from(r), f32::from(g), f32::from(b)])
        });
        let trimap = self.trimaps.generate(&alpha, rng);
        let quintet = RasterQuintet::new(image, alpha, foreground, background, trimap)?;

        self.finish(&quintet, crop, rng)
    }

    /// Crops, flips, resizes to the output size, then relabels and computes
    /// the gradient on the final rasters.
    fn finish<R: Rng + ?Sized>(
        &self,
        quintet: &RasterQuintet,
        crop: CropSize,
        rng: &mut R,
    ) -> Result<AssembledRasters, SampleError> {
        let (cropped, _) = self.geometry.apply(quintet, crop, rng)?;
        // The pre-crop trimap only steers the crop; it is rebuilt below.
        let (image, alpha, foreground, background, _) = cropped.into_parts();

        let CropSize { height, width } = self.config.output_size;
        let (image, alpha, foreground, background) = if image.dimensions() != (width, height) {
            (
                image.resize_linear(width, height)?,
                alpha.resize_linear(width, height)?,
                foreground.resize_linear(width, height)?,
                background.resize_linear(width, height)?,
            )
        } else {
            (image, alpha, foreground, background)
        };

        let trimap = self.trimaps.generate(&alpha, rng);
        let gradient = image.sobel_gradient();

        Ok(AssembledRasters {
            image,
            alpha,
            foreground,
            background,
            trimap,
            gradient,
        })
    }
}

/// Size the offline rasters are upsampled to so that `crop` fits.
///
/// With `r = max(crop_w / w, crop_h / h)`, returns `floor(w * r + 1)` by
/// `floor(h * r + 1)` when `r > 1`, otherwise `None`. Rasters with a zero
/// side also yield `None`.
pub fn offline_upsampled_size(width: u32, height: u32, crop: CropSize) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let ratio = f64::max(
        f64::from(crop.width) / f64::from(width),
        f64::from(crop.height) / f64::from(height),
    );
    (ratio > 1.0).then(|| {
        (
            (f64::from(width) * ratio + 1.0) as u32,
            (f64::from(height) * ratio + 1.0) as u32,
        )
    })
}
