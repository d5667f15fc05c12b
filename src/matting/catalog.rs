//! Directory-to-sample catalog construction.
//!
//! Foreground files are found by walking the foreground tree; every other
//! raster of a sample lives at the same relative path under its own root.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::CatalogError;
use crate::matting::config::DatasetLayout;

/// File extensions recognised as images.
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "JPG"];

/// Pre-rendered rasters paired with one foreground.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairedSources {
    pub background: PathBuf,
    pub composite: PathBuf,
}

/// Source files of one training example.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleDescriptor {
    pub alpha: PathBuf,
    pub foreground: PathBuf,
    /// Present for catalogs built from an offline layout
    pub paired: Option<PairedSources>,
}

/// Backgrounds drawn with replacement for online compositing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundPool(Vec<PathBuf>);

impl BackgroundPool {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self(paths)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.0.get(index).map(PathBuf::as_path)
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }
}

/// Immutable, index-addressable list of samples plus the background pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    samples: Vec<SampleDescriptor>,
    backgrounds: BackgroundPool,
}

impl Catalog {
    /// Walks the trees of `layout` and validates every sample.
    ///
    /// # Errors
    ///
    /// Fails on the first missing counterpart file, on an alpha/foreground
    /// size mismatch, on an unreadable tree, or when the foreground tree (or,
    /// online, the background tree) holds no image.
    pub fn build(layout: &DatasetLayout) -> Result<Self, CatalogError> {
        match layout {
            DatasetLayout::Online {
                alpha,
                foreground,
                background,
            } => {
                let samples = collect_samples(foreground, alpha, None)?;
                let backgrounds = list_image_files(background)?;
                log::info!("valid foreground samples: {}", samples.len());
                log::info!("valid background samples: {}", backgrounds.len());
                if backgrounds.is_empty() {
                    return Err(CatalogError::EmptyBackground(background.clone()));
                }
                Ok(Self {
                    samples,
                    backgrounds: BackgroundPool::new(backgrounds),
                })
            }
            DatasetLayout::Offline {
                alpha,
                foreground,
                background,
                composite,
            } => {
                let samples = collect_samples(foreground, alpha, Some((background, composite)))?;
                log::info!("valid samples: {}", samples.len());
                Ok(Self {
                    samples,
                    backgrounds: BackgroundPool::default(),
                })
            }
        }
    }

    /// Assembles a catalog from already validated parts.
    ///
    /// Online descriptors (without paired sources) need a non-empty pool.
    pub fn from_parts(
        samples: Vec<SampleDescriptor>,
        backgrounds: BackgroundPool,
    ) -> Result<Self, CatalogError> {
        if samples.is_empty() {
            return Err(CatalogError::EmptyForeground(PathBuf::new()));
        }
        if backgrounds.is_empty() && samples.iter().any(|s| s.paired.is_none()) {
            return Err(CatalogError::EmptyBackground(PathBuf::new()));
        }
        Ok(Self {
            samples,
            backgrounds,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SampleDescriptor> {
        self.samples.get(index)
    }

    pub fn samples(&self) -> &[SampleDescriptor] {
        &self.samples
    }

    pub fn backgrounds(&self) -> &BackgroundPool {
        &self.backgrounds
    }
}

fn collect_samples(
    foreground_root: &Path,
    alpha_root: &Path,
    paired_roots: Option<(&PathBuf, &PathBuf)>,
) -> Result<Vec<SampleDescriptor>, CatalogError> {
    let foregrounds = list_image_files(foreground_root)?;
    if foregrounds.is_empty() {
        return Err(CatalogError::EmptyForeground(foreground_root.to_path_buf()));
    }

    foregrounds
        .into_iter()
        .map(|foreground| -> Result<SampleDescriptor, CatalogError> {
            let alpha = counterpart(&foreground, foreground_root, alpha_root, "alpha")?;
            validate_alpha_dimensions(&alpha, &foreground)?;

            let paired = paired_roots
                .map(|(background_root, composite_root)| {
                    Ok::<_, CatalogError>(PairedSources {
                        background: counterpart(
                            &foreground,
                            foreground_root,
                            background_root,
                            "background",
                        )?,
                        composite: counterpart(
                            &foreground,
                            foreground_root,
                            composite_root,
                            "composite",
                        )?,
                    })
                })
                .transpose()?;

            Ok(SampleDescriptor {
                alpha,
                foreground,
                paired,
            })
        })
        .collect()
}

/// Recursively lists image files under `root`, following symlinks, sorted
/// by path.
pub fn list_image_files(root: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| CatalogError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_supported_image(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
}

/// Derives the path of `role` for `foreground` by swapping the root prefix,
/// and checks that it exists.
fn counterpart(
    foreground: &Path,
    foreground_root: &Path,
    other_root: &Path,
    role: &'static str,
) -> Result<PathBuf, CatalogError> {
    let relative =
        foreground
            .strip_prefix(foreground_root)
            .map_err(|_| CatalogError::OutsideRoot {
                path: foreground.to_path_buf(),
                root: foreground_root.to_path_buf(),
            })?;
    let expected = other_root.join(relative);
    if expected.exists() {
        Ok(expected)
    } else {
        Err(CatalogError::MissingCounterpart {
            role,
            expected,
            foreground: foreground.to_path_buf(),
        })
    }
}

fn validate_alpha_dimensions(alpha: &Path, foreground: &Path) -> Result<(), CatalogError> {
    let alpha_size = read_dimensions(alpha)?;
    let foreground_size = read_dimensions(foreground)?;
    if alpha_size != foreground_size {
        return Err(CatalogError::DimensionMismatch {
            alpha: alpha.to_path_buf(),
            alpha_size,
            foreground: foreground.to_path_buf(),
            foreground_size,
        });
    }
    Ok(())
}

fn read_dimensions(path: &Path) -> Result<(u32, u32), CatalogError> {
    image::image_dimensions(path).map_err(|source| CatalogError::Header {
        path: path.to_path_buf(),
        source,
    })
}
