use std::path::PathBuf;

use thiserror::Error;

/// Error type for pipeline configuration
///
/// Returned when crop size lists or output sizes cannot describe a valid
/// sampling pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Crop heights and crop widths were given with different lengths
    #[error("Crop height list has {heights} entries but crop width list has {widths}")]
    CropListLengthMismatch { heights: usize, widths: usize },

    /// No candidate crop size was given
    #[error("At least one crop size is required")]
    EmptyCropList,

    /// A crop size has a zero side
    #[error("Crop size must be non-zero, got {height}x{width} (h x w)")]
    ZeroCropSize { height: u32, width: u32 },

    /// The final output size has a zero side
    #[error("Output size must be non-zero, got {height}x{width} (h x w)")]
    ZeroOutputSize { height: u32, width: u32 },
}

/// Error type for catalog construction
///
/// Any of these aborts construction of the whole catalog. No partial catalog
/// with skipped entries is ever produced.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A directory tree could not be walked
    #[error("Failed to walk directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A foreground file lies outside the foreground root, so no counterpart
    /// path can be derived by prefix substitution
    #[error("File {path} is not below root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// The file derived for a foreground entry does not exist
    ///
    /// `role` names the missing raster (alpha, background or composite).
    #[error("Missing {role} file {expected} for foreground {foreground}")]
    MissingCounterpart {
        role: &'static str,
        expected: PathBuf,
        foreground: PathBuf,
    },

    /// The foreground tree contained no image file
    #[error("No foreground images found under {0}")]
    EmptyForeground(PathBuf),

    /// The background tree contained no image file
    #[error("No background images found under {0}")]
    EmptyBackground(PathBuf),

    /// Alpha matte and foreground image have different pixel dimensions
    #[error("Alpha {alpha} is {alpha_size:?} but foreground {foreground} is {foreground_size:?} (w, h)")]
    DimensionMismatch {
        alpha: PathBuf,
        alpha_size: (u32, u32),
        foreground: PathBuf,
        foreground_size: (u32, u32),
    },

    /// Image header could not be read while validating dimensions
    #[error("Failed to read image header of {path}: {source}")]
    Header {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Error type for a single sample retrieval
///
/// A failed retrieval produces nothing; the caller decides whether to skip
/// the index or abort.
#[derive(Debug, Error)]
pub enum SampleError {
    /// Requested index is past the end of the catalog
    #[error("Sample index {index} out of range for catalog of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// An online sample was requested but the catalog has no background
    #[error("Background pool is empty")]
    EmptyBackgroundPool,

    /// A source file could not be decoded
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Decoded rasters that must be co-registered have different sizes
    #[error("Dimension mismatch between {first} {first_size:?} and {second} {second_size:?} (w, h)")]
    DimensionMismatch {
        first: PathBuf,
        first_size: (u32, u32),
        second: PathBuf,
        second_size: (u32, u32),
    },

    #[error(transparent)]
    Composite(#[from] CompositeError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Resize(#[from] ResizeError),
}

/// Error type for alpha compositing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    /// Foreground and alpha do not share dimensions
    #[error("Foreground and alpha dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Foreground dimensions (width, height)
        expected: (u32, u32),
        /// Alpha dimensions (width, height)
        actual: (u32, u32),
    },

    /// One of the inputs has no pixels
    #[error("Cannot composite an empty raster")]
    EmptyImage,

    /// Upsampling or background fitting failed
    #[error(transparent)]
    Resize(#[from] ResizeError),
}

/// Error type for crop and flip operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Crop window does not fit inside the raster
    #[error("Crop window {width}x{height} at ({x}, {y}) exceeds raster {raster_width}x{raster_height}")]
    WindowOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        raster_width: u32,
        raster_height: u32,
    },

    /// Rasters of the quintet are not co-registered
    #[error("Raster {name} is {actual:?} but the quintet is {expected:?} (w, h)")]
    NotCoRegistered {
        name: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Error type for bilinear resizing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResizeError {
    /// Invalid target dimensions
    #[error("Invalid target dimensions: width={width}, height={height}")]
    InvalidTargetDimensions { width: u32, height: u32 },

    /// Source image has no pixels
    #[error("Source image is empty: width={width}, height={height}")]
    EmptyImage { width: u32, height: u32 },
}

/// Error type for the offline trimap tool
#[derive(Debug, Error)]
pub enum TrimapToolError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
