//! File-backed dataset: decodes one catalog entry per retrieval and runs the
//! sample pipeline over it.

use std::path::Path;

use image::{Luma, Rgb};
use imageproc::definitions::Image;
use rand::Rng;

use crate::error::SampleError;
use crate::matting::catalog::{Catalog, PairedSources, SampleDescriptor};
use crate::matting::composite::first_channel;
use crate::matting::config::PipelineConfig;
use crate::matting::pipeline::{worker_rng, SamplePipeline};
use crate::matting::sample::{MattingSample, Provenance, RasterShape, SourcePaths};
use crate::matting::trimap::TrimapGenerator;

/// Read-only dataset over a catalog.
///
/// Retrievals never mutate the dataset, so it can be shared across threads
/// as long as each thread brings its own random generator.
#[derive(Debug, Clone)]
pub struct MattingDataset {
    catalog: Catalog,
    pipeline: SamplePipeline,
}

impl MattingDataset {
    pub fn new(catalog: Catalog, config: PipelineConfig) -> Self {
        Self {
            catalog,
            pipeline: SamplePipeline::new(config),
        }
    }

    #[must_use]
    pub fn with_trimap_generator(mut self, trimaps: TrimapGenerator) -> Self {
        self.pipeline = self.pipeline.with_trimap_generator(trimaps);
        self
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pipeline(&self) -> &SamplePipeline {
        &self.pipeline
    }

    /// Builds a fresh augmented sample for `index`.
    ///
    /// Online entries draw a background uniformly from the pool with
    /// replacement. Nothing is cached; every call decodes the source files
    /// again and draws new augmentation parameters.
    ///
    /// # Errors
    ///
    /// * `SampleError::IndexOutOfRange` - When `index >= len()`
    /// * `SampleError::Decode` - When a source file cannot be decoded
    /// * `SampleError::DimensionMismatch` - When co-registered sources differ in size
    pub fn get<R: Rng + ?Sized>(
        &self,
        index: usize,
        rng: &mut R,
    ) -> Result<MattingSample, SampleError> {
        let descriptor = self
            .catalog
            .get(index)
            .ok_or(SampleError::IndexOutOfRange {
                index,
                len: self.catalog.len(),
            })?;

        match &descriptor.paired {
            None => self.get_online(descriptor, rng),
            Some(paired) => self.get_offline(descriptor, paired, rng),
        }
    }

    /// Same as [`get`](Self::get) with a generator derived from `seed` and
    /// `index`.
    pub fn get_seeded(&self, index: usize, seed: u64) -> Result<MattingSample, SampleError> {
        let mut rng = worker_rng(seed, index as u64);
        self.get(index, &mut rng)
    }

    /// Retrieves several samples in parallel, each with its own generator.
    #[cfg(feature = "rayon")]
    pub fn par_get_many(
        &self,
        indices: &[usize],
        seed: u64,
    ) -> Vec<Result<MattingSample, SampleError>> {
        use rayon::prelude::*;

        indices
            .par_iter()
            .map(|&index| self.get_seeded(index, seed))
            .collect()
    }

    fn get_online<R: Rng + ?Sized>(
        &self,
        descriptor: &SampleDescriptor,
        rng: &mut R,
    ) -> Result<MattingSample, SampleError> {
        let pool = self.catalog.backgrounds().as_slice();
        if pool.is_empty() {
            return Err(SampleError::EmptyBackgroundPool);
        }
        let background_path = &pool[rng.random_range(0..pool.len())];

        let foreground = open_rgb(&descriptor.foreground)?;
        let alpha = open_rgb(&descriptor.alpha)?;
        check_same_size(
            &descriptor.foreground,
            foreground.dimensions(),
            &descriptor.alpha,
            alpha.dimensions(),
        )?;
        let background = open_rgb(background_path)?;

        let provenance = Provenance {
            sources: SourcePaths {
                foreground: descriptor.foreground.clone(),
                alpha: descriptor.alpha.clone(),
                background: background_path.clone(),
                composite: None,
            },
            foreground_shape: RasterShape::of_rgb(&foreground),
            background_shape: RasterShape::of_rgb(&background),
        };

        let rasters = self
            .pipeline
            .assemble_online(foreground, alpha, &background, rng)?;
        Ok(rasters.into_sample(provenance))
    }

    fn get_offline<R: Rng + ?Sized>(
        &self,
        descriptor: &SampleDescriptor,
        paired: &PairedSources,
        rng: &mut R,
    ) -> Result<MattingSample, SampleError> {
        let foreground = open_rgb(&descriptor.foreground)?;
        let background = open_rgb(&paired.background)?;
        let image = open_rgb(&paired.composite)?;
        let alpha = open_first_channel(&descriptor.alpha)?;

        let size = foreground.dimensions();
        check_same_size(
            &descriptor.foreground,
            size,
            &paired.background,
            background.dimensions(),
        )?;
        check_same_size(
            &descriptor.foreground,
            size,
            &paired.composite,
            image.dimensions(),
        )?;
        check_same_size(&descriptor.foreground, size, &descriptor.alpha, alpha.dimensions())?;

        let provenance = Provenance {
            sources: SourcePaths {
                foreground: descriptor.foreground.clone(),
                alpha: descriptor.alpha.clone(),
                background: paired.background.clone(),
                composite: Some(paired.composite.clone()),
            },
            foreground_shape: RasterShape::of_rgb(&foreground),
            background_shape: RasterShape::of_rgb(&background),
        };

        let rasters = self
            .pipeline
            .assemble_offline(image, alpha, foreground, background, rng)?;
        Ok(rasters.into_sample(provenance))
    }
}

fn open_rgb(path: &Path) -> Result<Image<Rgb<u8>>, SampleError> {
    image::open(path)
        .map(|decoded| decoded.to_rgb8())
        .map_err(|source| SampleError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Decodes a matte and keeps its first colour channel.
fn open_first_channel(path: &Path) -> Result<Image<Luma<u8>>, SampleError> {
    let (alpha, _) = first_channel(&open_rgb(path)?);
    Ok(alpha)
}

fn check_same_size(
    first: &Path,
    first_size: (u32, u32),
    second: &Path,
    second_size: (u32, u32),
) -> Result<(), SampleError> {
    if first_size == second_size {
        Ok(())
    } else {
        Err(SampleError::DimensionMismatch {
            first: first.to_path_buf(),
            first_size,
            second: second.to_path_buf(),
            second_size,
        })
    }
}
