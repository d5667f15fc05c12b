//! Pipeline configuration: crop candidates, output size, flip toggle and
//! directory layout.

use std::path::PathBuf;

use rand::seq::IndexedRandom;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Crop size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CropSize {
    pub height: u32,
    pub width: u32,
}

impl CropSize {
    pub const fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}

/// Ordered, non-empty list of candidate crop sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<CropSize>", into = "Vec<CropSize>"))]
pub struct CropSpecList(Vec<CropSize>);

impl CropSpecList {
    /// Builds the list from parallel height and width sequences.
    ///
    /// # Errors
    ///
    /// * `ConfigError::CropListLengthMismatch` - When the sequences differ in length
    /// * `ConfigError::EmptyCropList` - When both are empty
    /// * `ConfigError::ZeroCropSize` - When any size has a zero side
    pub fn from_parallel(heights: &[u32], widths: &[u32]) -> Result<Self, ConfigError> {
        if heights.len() != widths.len() {
            return Err(ConfigError::CropListLengthMismatch {
                heights: heights.len(),
                widths: widths.len(),
            });
        }
        Self::new(
            heights
                .iter()
                .zip(widths)
                .map(|(&height, &width)| CropSize::new(height, width))
                .collect(),
        )
    }

    pub fn new(sizes: Vec<CropSize>) -> Result<Self, ConfigError> {
        if sizes.is_empty() {
            return Err(ConfigError::EmptyCropList);
        }
        if let Some(bad) = sizes.iter().find(|s| s.height == 0 || s.width == 0) {
            return Err(ConfigError::ZeroCropSize {
                height: bad.height,
                width: bad.width,
            });
        }
        Ok(Self(sizes))
    }

    /// Single candidate.
    pub fn single(height: u32, width: u32) -> Result<Self, ConfigError> {
        Self::new(vec![CropSize::new(height, width)])
    }

    /// Draws one candidate uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> CropSize {
        // Non-empty by construction
        *self.0.choose(rng).unwrap_or(&self.0[0])
    }

    /// Largest height and largest width over all candidates.
    pub fn largest(&self) -> CropSize {
        self.0.iter().fold(CropSize::new(0, 0), |acc, s| {
            CropSize::new(acc.height.max(s.height), acc.width.max(s.width))
        })
    }

    pub fn as_slice(&self) -> &[CropSize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<CropSize>> for CropSpecList {
    type Error = ConfigError;

    fn try_from(sizes: Vec<CropSize>) -> Result<Self, Self::Error> {
        Self::new(sizes)
    }
}

impl From<CropSpecList> for Vec<CropSize> {
    fn from(list: CropSpecList) -> Self {
        list.0
    }
}

/// Settings shared by every retrieval of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// Final output size
    pub output_size: CropSize,
    /// Candidate crop sizes, one drawn per retrieval
    pub crop_sizes: CropSpecList,
    /// Whether to mirror samples horizontally with probability 0.5
    pub flip: bool,
}

impl PipelineConfig {
    /// Creates a configuration with flipping disabled.
    pub fn new(
        output_height: u32,
        output_width: u32,
        crop_sizes: CropSpecList,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            output_size: CropSize::new(output_height, output_width),
            crop_sizes,
            flip: false,
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    /// Checks the invariants a deserialized configuration may have skipped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_size.height == 0 || self.output_size.width == 0 {
            return Err(ConfigError::ZeroOutputSize {
                height: self.output_size.height,
                width: self.output_size.width,
            });
        }
        Ok(())
    }
}

/// Directory roots of the parallel trees a catalog is built from.
///
/// Every counterpart path is derived by replacing the foreground root prefix
/// of a foreground file with another root.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DatasetLayout {
    /// Backgrounds form an independent pool; images are composited per draw.
    Online {
        alpha: PathBuf,
        foreground: PathBuf,
        background: PathBuf,
    },
    /// Every foreground has a paired background and a pre-composited image.
    Offline {
        alpha: PathBuf,
        foreground: PathBuf,
        background: PathBuf,
        composite: PathBuf,
    },
}
