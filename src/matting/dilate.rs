//! Grayscale morphological dilation with elliptical structuring elements.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::definitions::Image;
use imageproc::morphology::{grayscale_dilate, Mask};

/// Largest element side `imageproc` masks accept with a `u8` anchor.
pub const MAX_ELEMENT_SIZE: u32 = 511;

/// Binary structuring element with an anchor at `(width / 2, height / 2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: u32,
    height: u32,
    mask: Vec<bool>,
}

impl StructuringElement {
    /// Builds an elliptical element inscribed in a `size x size` square.
    ///
    /// Rows are filled the way OpenCV's `MORPH_ELLIPSE` fills them: for each
    /// row the half-span is `round(c * sqrt(1 - dy^2 / r^2))` around the
    /// centre column `c`, clipped to the square. Sizes are clamped to
    /// `1..=MAX_ELEMENT_SIZE`.
    pub fn ellipse(size: u32) -> Self {
        let size = size.clamp(1, MAX_ELEMENT_SIZE);
        let radius = (size / 2) as i64;
        let centre = (size / 2) as i64;
        let inv_r2 = if radius > 0 {
            1.0 / (radius * radius) as f64
        } else {
            0.0
        };

        let mut mask = vec![false; (size * size) as usize];
        for row in 0..size as i64 {
            let dy = row - radius;
            if dy.abs() > radius {
                continue;
            }
            let span = if radius > 0 {
                (centre as f64 * (((radius * radius - dy * dy) as f64) * inv_r2).sqrt()).round()
                    as i64
            } else {
                0
            };
            let start = (centre - span).max(0);
            let end = (centre + span + 1).min(size as i64);
            for col in start..end {
                mask[(row * size as i64 + col) as usize] = true;
            }
        }

        Self {
            width: size,
            height: size,
            mask,
        }
    }

    /// Anchor position `(x, y)` inside the element.
    pub const fn anchor(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the element covers `(x, y)`.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.mask[(y * self.width + x) as usize]
    }

    /// Morphology mask of the covered cells, centred on the anchor.
    pub fn to_mask(&self) -> Mask {
        let image: GrayImage = ImageBuffer::from_fn(self.width, self.height, |x, y| {
            Luma([if self.contains(x, y) { u8::MAX } else { 0 }])
        });
        let (ax, ay) = self.anchor();
        // Sizes are capped at MAX_ELEMENT_SIZE, so both anchors fit in a u8.
        Mask::from_image(&image, ax as u8, ay as u8)
    }
}

/// Trait providing grayscale dilation
pub trait DilateExt {
    /// Dilates the image by `element`, `iterations` times.
    ///
    /// Each output pixel is the maximum of the input over the element's
    /// support placed at that pixel. Samples outside the image are ignored.
    /// Zero iterations return an unchanged copy.
    fn dilate(&self, element: &StructuringElement, iterations: u32) -> Self;
}

impl DilateExt for Image<Luma<u8>> {
    fn dilate(&self, element: &StructuringElement, iterations: u32) -> Self {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return self.clone();
        }

        let mask = element.to_mask();
        let mut current = self.clone();
        for _ in 0..iterations {
            current = grayscale_dilate(&current, &mask);
        }
        current
    }
}
