//! Performance benchmarks for matting-dataset
//!
//! Measures the per-sample stages at training-like resolutions to track
//! regressions in the data loading hot path.

use criterion::*;
use image::{Luma, Rgb};
use itertools::iproduct;
use matting_dataset::{
    AlphaBlendExt, CropSpecList, DilateExt, Image, PipelineConfig, ResizeLinearExt,
    SamplePipeline, SobelGradientExt, StructuringElement, TrimapGenerator, TrimapParams,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

/// Helper function to create a test RGB image with specific dimensions
fn create_rgb_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(width, height);

    // Gradient with some content
    iproduct!(0..height, 0..width).for_each(|(y, x)| {
        let r = ((x * 255) / width) as u8;
        let g = ((y * 255) / height) as u8;
        let b = ((x + y) * 255 / (width + height)) as u8;
        image.put_pixel(x, y, Rgb([r, g, b]));
    });

    image
}

/// Helper function to create a soft disc matte
fn create_alpha_matte(width: u32, height: u32) -> Image<Luma<u8>> {
    let mut mask: Image<Luma<u8>> = Image::new(width, height);

    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = (width.min(height) as f32) / 3.0;

    iproduct!(0..height, 0..width).for_each(|(y, x)| {
        let distance = (x as f32 - center_x).hypot(y as f32 - center_y);
        let alpha = (255.0 * (1.0 - (distance - radius).clamp(0.0, 8.0) / 8.0)) as u8;
        mask.put_pixel(x, y, Luma([alpha]));
    });

    mask
}

fn to_rgb(alpha: &Image<Luma<u8>>) -> Image<Rgb<u8>> {
    Image::from_fn(alpha.width(), alpha.height(), |x, y| {
        let v = alpha.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

fn bench_trimap_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("trimap_generation");
    let alpha = create_alpha_matte(320, 320);

    for (kernel_size, iterations) in [(1, 1), (3, 10), (4, 19)] {
        let params = TrimapParams {
            kernel_size,
            iterations,
        };
        group.bench_with_input(
            BenchmarkId::new("kernel_iterations", format!("{kernel_size}x{iterations}")),
            &params,
            |b, &params| b.iter(|| TrimapGenerator::generate_with(black_box(&alpha), params)),
        );
    }

    group.finish();
}

fn bench_dilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dilation");
    let alpha = create_alpha_matte(320, 320);

    for size in [1, 2, 3, 4] {
        let element = StructuringElement::ellipse(size);
        group.bench_with_input(BenchmarkId::new("ellipse", size), &element, |b, element| {
            b.iter(|| black_box(&alpha).dilate(element, 1))
        });
    }

    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_linear");
    let image = create_rgb_image(640, 480);

    for (width, height) in [(320, 320), (512, 512), (1024, 768)] {
        group.throughput(Throughput::Elements(u64::from(width * height)));
        group.bench_with_input(
            BenchmarkId::new("rgb_u8", format!("{width}x{height}")),
            &(width, height),
            |b, &(width, height)| b.iter(|| black_box(&image).resize_linear(width, height)),
        );
    }

    group.finish();
}

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");

    for size in [128u32, 320, 512] {
        let foreground = create_rgb_image(size, size);
        let background = create_rgb_image(size, size);
        let alpha = to_rgb(&create_alpha_matte(size, size));

        group.throughput(Throughput::Elements(u64::from(size * size)));
        group.bench_with_input(BenchmarkId::new("alpha_blend", size), &size, |b, _| {
            b.iter(|| black_box(&foreground).alpha_blend(black_box(&alpha), black_box(&background)))
        });
    }

    group.finish();
}

fn bench_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("sobel_gradient");

    for size in [128u32, 320, 512] {
        let image: Image<Rgb<f32>> = Image::from_fn(size, size, |x, y| {
            Rgb([(x % 256) as f32, (y % 256) as f32, ((x + y) % 256) as f32])
        });
        group.bench_with_input(BenchmarkId::new("rgb_f32", size), &image, |b, image| {
            b.iter(|| black_box(image).sobel_gradient())
        });
    }

    group.finish();
}

fn bench_online_sample(c: &mut Criterion) {
    let foreground = create_rgb_image(640, 480);
    let alpha = to_rgb(&create_alpha_matte(640, 480));
    let background = create_rgb_image(800, 600);

    let crops = CropSpecList::from_parallel(&[320, 480, 640], &[320, 480, 640]).unwrap();
    let config = PipelineConfig::new(320, 320, crops).unwrap().with_flip(true);
    let pipeline = SamplePipeline::new(config);

    c.bench_function("online_sample_640x480", |b| {
        let mut rng = StdRng::seed_from_u64(0);
        b.iter(|| {
            pipeline.assemble_online(
                black_box(foreground.clone()),
                black_box(alpha.clone()),
                black_box(&background),
                &mut rng,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_trimap_generation,
    bench_dilation,
    bench_resize,
    bench_composite,
    bench_gradient,
    bench_online_sample,
);

criterion_main!(benches);
