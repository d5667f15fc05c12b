use image::{GenericImageView, ImageBuffer, Pixel};
use imageproc::definitions::Image;

use crate::error::ResizeError;
use crate::utils::FromInterpolated;

/// Element of the weight table for linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationWeight {
    /// Lower source index
    pub lower_index: u32,
    /// Upper source index
    pub upper_index: u32,
    /// Weight of the upper sample; the lower sample gets `1 - upper_weight`
    pub upper_weight: f32,
}

/// OpenCV INTER_LINEAR interpolation implementation.
///
/// Sample positions use half-pixel centres and samples past the border are
/// clamped to the edge, so the mapping is symmetric for up- and downscaling.
pub struct InterLinearResize {
    /// New width
    pub new_width: u32,
    /// New height
    pub new_height: u32,
}

impl InterLinearResize {
    /// Create a new INTER_LINEAR resizer.
    pub const fn new(new_width: u32, new_height: u32) -> Result<Self, ResizeError> {
        if new_width == 0 || new_height == 0 {
            return Err(ResizeError::InvalidTargetDimensions {
                width: new_width,
                height: new_height,
            });
        }
        Ok(Self {
            new_width,
            new_height,
        })
    }

    /// Resize image using INTER_LINEAR interpolation.
    ///
    /// Resizing to the source size returns a pixel-identical copy.
    pub fn resize<I, P>(&self, src: &I) -> Result<Image<P>, ResizeError>
    where
        I: GenericImageView<Pixel = P>,
        P: Pixel,
        P::Subpixel: FromInterpolated,
    {
        let (src_width, src_height) = src.dimensions();

        if src_width == 0 || src_height == 0 {
            return Err(ResizeError::EmptyImage {
                width: src_width,
                height: src_height,
            });
        }

        if (src_width, src_height) == (self.new_width, self.new_height) {
            return Ok(ImageBuffer::from_fn(src_width, src_height, |x, y| {
                src.get_pixel(x, y)
            }));
        }

        let x_weights = compute_interpolation_weights_impl(src_width, self.new_width);
        let y_weights = compute_interpolation_weights_impl(src_height, self.new_height);

        Ok(resize_linear_impl(src, &x_weights, &y_weights))
    }
}

/// Compute the per-destination source pair and weight for one axis.
fn compute_interpolation_weights_impl(src_size: u32, dst_size: u32) -> Vec<InterpolationWeight> {
    let scale = src_size as f32 / dst_size as f32;
    let last = src_size - 1;

    (0..dst_size)
        .map(|d| {
            let position = (d as f32 + 0.5) * scale - 0.5;
            let floor = position.floor();
            let fraction = position - floor;

            if floor < 0.0 {
                InterpolationWeight {
                    lower_index: 0,
                    upper_index: 0,
                    upper_weight: 0.0,
                }
            } else if floor as u32 >= last {
                InterpolationWeight {
                    lower_index: last,
                    upper_index: last,
                    upper_weight: 0.0,
                }
            } else {
                let lower = floor as u32;
                InterpolationWeight {
                    lower_index: lower,
                    upper_index: lower + 1,
                    upper_weight: fraction,
                }
            }
        })
        .collect()
}

fn resize_linear_impl<I, P>(
    src: &I,
    x_weights: &[InterpolationWeight],
    y_weights: &[InterpolationWeight],
) -> Image<P>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
    P::Subpixel: FromInterpolated,
{
    let channels = P::CHANNEL_COUNT as usize;
    let dst_width = x_weights.len() as u32;
    let dst_height = y_weights.len() as u32;

    let mut top = vec![0.0f32; channels];
    let mut bottom = vec![0.0f32; channels];
    let mut output_channels = Vec::with_capacity(channels);

    ImageBuffer::from_fn(dst_width, dst_height, |dx, dy| {
        let xw = x_weights[dx as usize];
        let yw = y_weights[dy as usize];

        // Horizontal pass on the two contributing rows
        blend_row(src, xw, yw.lower_index, &mut top);
        blend_row(src, xw, yw.upper_index, &mut bottom);

        // Vertical pass
        output_channels.clear();
        output_channels.extend(top.iter().zip(bottom.iter()).map(|(&t, &b)| {
            P::Subpixel::from_interpolated(t * (1.0 - yw.upper_weight) + b * yw.upper_weight)
        }));

        *P::from_slice(&output_channels)
    })
}

#[inline]
fn blend_row<I, P>(src: &I, xw: InterpolationWeight, y: u32, out: &mut [f32])
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
    P::Subpixel: FromInterpolated,
{
    let left = src.get_pixel(xw.lower_index, y);
    let right = src.get_pixel(xw.upper_index, y);
    for ((o, &l), &r) in out.iter_mut().zip(left.channels()).zip(right.channels()) {
        *o = l.into() * (1.0 - xw.upper_weight) + r.into() * xw.upper_weight;
    }
}

/// Extension trait for ImageBuffer to provide INTER_LINEAR resize methods.
pub trait ResizeLinearExt<P>
where
    P: Pixel,
{
    /// Resize image using INTER_LINEAR interpolation.
    fn resize_linear(&self, new_width: u32, new_height: u32) -> Result<Self, ResizeError>
    where
        Self: Sized;
}

impl<P> ResizeLinearExt<P> for Image<P>
where
    P: Pixel,
    P::Subpixel: FromInterpolated,
{
    fn resize_linear(&self, new_width: u32, new_height: u32) -> Result<Self, ResizeError> {
        let resizer = InterLinearResize::new(new_width, new_height)?;
        resizer.resize(self)
    }
}
