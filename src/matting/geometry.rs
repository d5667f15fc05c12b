//! Joint crop and mirror of the five co-registered rasters of a sample.

use image::{imageops, Luma, Pixel, Rgb};
use imageproc::definitions::Image;
use rand::Rng;

use crate::error::GeometryError;
use crate::matting::config::CropSize;
use crate::matting::trimap::Trimap;

/// Axis-aligned crop window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropWindow {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn check_fits(&self, (raster_width, raster_height): (u32, u32)) -> Result<(), GeometryError> {
        let fits_x = self.x.checked_add(self.width).is_some_and(|end| end <= raster_width);
        let fits_y = self.y.checked_add(self.height).is_some_and(|end| end <= raster_height);
        if fits_x && fits_y {
            Ok(())
        } else {
            Err(GeometryError::WindowOutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                raster_width,
                raster_height,
            })
        }
    }
}

/// Crop and mirror operations shared by every raster type
pub trait RasterOps: Sized {
    /// Copies out the pixels under `window`.
    ///
    /// # Errors
    ///
    /// * `GeometryError::WindowOutOfBounds` - When the window leaves the raster
    fn crop_window(&self, window: CropWindow) -> Result<Self, GeometryError>;

    /// Mirrors the raster left to right.
    fn mirror_horizontal(&self) -> Self;
}

impl<P> RasterOps for Image<P>
where
    P: Pixel + 'static,
{
    fn crop_window(&self, window: CropWindow) -> Result<Self, GeometryError> {
        window.check_fits(self.dimensions())?;
        Ok(imageops::crop_imm(self, window.x, window.y, window.width, window.height).to_image())
    }

    fn mirror_horizontal(&self) -> Self {
        imageops::flip_horizontal(self)
    }
}

impl RasterOps for Trimap {
    fn crop_window(&self, window: CropWindow) -> Result<Self, GeometryError> {
        let labels = self.as_image().crop_window(window)?;
        Ok(Trimap::from_labels_unchecked(labels))
    }

    fn mirror_horizontal(&self) -> Self {
        Trimap::from_labels_unchecked(self.as_image().mirror_horizontal())
    }
}

/// The five rasters of one sample, always the same size.
#[derive(Debug, Clone)]
pub struct RasterQuintet {
    image: Image<Rgb<f32>>,
    alpha: Image<Luma<u8>>,
    foreground: Image<Rgb<u8>>,
    background: Image<Rgb<u8>>,
    trimap: Trimap,
}

impl RasterQuintet {
    /// Groups five rasters after checking they share one size.
    ///
    /// # Errors
    ///
    /// * `GeometryError::NotCoRegistered` - When any raster differs in size from `image`
    pub fn new(
        image: Image<Rgb<f32>>,
        alpha: Image<Luma<u8>>,
        foreground: Image<Rgb<u8>>,
        background: Image<Rgb<u8>>,
        trimap: Trimap,
    ) -> Result<Self, GeometryError> {
        let expected = image.dimensions();
        for (name, actual) in [
            ("alpha", alpha.dimensions()),
            ("foreground", foreground.dimensions()),
            ("background", background.dimensions()),
            ("trimap", trimap.dimensions()),
        ] {
            if actual != expected {
                return Err(GeometryError::NotCoRegistered {
                    name,
                    expected,
                    actual,
                });
            }
        }
        Ok(Self {
            image,
            alpha,
            foreground,
            background,
            trimap,
        })
    }

    /// Shared `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &Image<Rgb<f32>> {
        &self.image
    }

    pub fn alpha(&self) -> &Image<Luma<u8>> {
        &self.alpha
    }

    pub fn foreground(&self) -> &Image<Rgb<u8>> {
        &self.foreground
    }

    pub fn background(&self) -> &Image<Rgb<u8>> {
        &self.background
    }

    pub fn trimap(&self) -> &Trimap {
        &self.trimap
    }

    /// Splits into `(image, alpha, foreground, background, trimap)`.
    #[allow(clippy::type_complexity)]
    pub fn into_parts(
        self,
    ) -> (
        Image<Rgb<f32>>,
        Image<Luma<u8>>,
        Image<Rgb<u8>>,
        Image<Rgb<u8>>,
        Trimap,
    ) {
        (
            self.image,
            self.alpha,
            self.foreground,
            self.background,
            self.trimap,
        )
    }
}

impl RasterOps for RasterQuintet {
    fn crop_window(&self, window: CropWindow) -> Result<Self, GeometryError> {
        window.check_fits(self.dimensions())?;
        Ok(Self {
            image: self.image.crop_window(window)?,
            alpha: self.alpha.crop_window(window)?,
            foreground: self.foreground.crop_window(window)?,
            background: self.background.crop_window(window)?,
            trimap: self.trimap.crop_window(window)?,
        })
    }

    fn mirror_horizontal(&self) -> Self {
        Self {
            image: self.image.mirror_horizontal(),
            alpha: self.alpha.mirror_horizontal(),
            foreground: self.foreground.mirror_horizontal(),
            background: self.background.mirror_horizontal(),
            trimap: self.trimap.mirror_horizontal(),
        }
    }
}

/// What a geometry transform did to a quintet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformRecord {
    pub window: CropWindow,
    pub flipped: bool,
}

/// Unknown-band-biased crop followed by an optional shared mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryTransform {
    flip: bool,
}

impl GeometryTransform {
    pub const fn new(flip: bool) -> Self {
        Self { flip }
    }

    /// Picks the crop window for `crop` over a raster labelled by `trimap`.
    ///
    /// The top-left corner is a uniformly drawn unknown pixel, or `(0, 0)`
    /// when there is none, clamped so the window stays inside the raster.
    pub fn choose_window<R: Rng + ?Sized>(
        trimap: &Trimap,
        crop: CropSize,
        rng: &mut R,
    ) -> CropWindow {
        let (width, height) = trimap.dimensions();
        let unknown = trimap.unknown_pixels();
        let (x, y) = if unknown.is_empty() {
            (0, 0)
        } else {
            unknown[rng.random_range(0..unknown.len())]
        };
        CropWindow::new(
            x.min(width.saturating_sub(crop.width)),
            y.min(height.saturating_sub(crop.height)),
            crop.width,
            crop.height,
        )
    }

    /// Crops all five rasters to `crop` and mirrors all or none of them.
    ///
    /// # Errors
    ///
    /// * `GeometryError::WindowOutOfBounds` - When the quintet is smaller than `crop`
    pub fn apply<R: Rng + ?Sized>(
        &self,
        quintet: &RasterQuintet,
        crop: CropSize,
        rng: &mut R,
    ) -> Result<(RasterQuintet, TransformRecord), GeometryError> {
        let window = Self::choose_window(quintet.trimap(), crop, rng);
        let cropped = quintet.crop_window(window)?;

        let flipped = self.flip && rng.random_bool(0.5);
        let result = if flipped {
            cropped.mirror_horizontal()
        } else {
            cropped
        };

        log::debug!(
            "crop {}x{} at ({}, {}), flipped={}",
            window.width,
            window.height,
            window.x,
            window.y,
            flipped
        );
        Ok((result, TransformRecord { window, flipped }))
    }
}
