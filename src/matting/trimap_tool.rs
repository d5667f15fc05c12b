//! Batch trimap generation for a directory of mattes.

use std::fs;
use std::path::Path;

use crate::error::TrimapToolError;
use crate::matting::catalog::is_supported_image;
use crate::matting::trimap::{TrimapGenerator, TrimapParams};

/// Writes a trimap for every matte directly inside `alpha_dir`.
///
/// Each matte is decoded as grayscale, labelled with the fixed `params`, and
/// saved under the same file name in `out_dir`, which is created if needed.
/// Returns the number of trimaps written.
pub fn generate_trimap_directory(
    alpha_dir: &Path,
    out_dir: &Path,
    params: TrimapParams,
) -> Result<usize, TrimapToolError> {
    let read_dir = |source| TrimapToolError::ReadDir {
        path: alpha_dir.to_path_buf(),
        source,
    };

    let mut mattes = fs::read_dir(alpha_dir)
        .map_err(read_dir)?
        .map(|entry| entry.map(|e| e.path()).map_err(read_dir))
        .collect::<Result<Vec<_>, _>>()?;
    mattes.retain(|path| path.is_file() && is_supported_image(path));
    mattes.sort();
    log::info!("images count: {}", mattes.len());

    fs::create_dir_all(out_dir).map_err(|source| TrimapToolError::CreateDir {
        path: out_dir.to_path_buf(),
        source,
    })?;

    for matte in &mattes {
        let alpha = image::open(matte)
            .map_err(|source| TrimapToolError::Decode {
                path: matte.clone(),
                source,
            })?
            .to_luma8();

        let trimap = TrimapGenerator::generate_with(&alpha, params);

        // Paths from read_dir always carry a file name
        let target = out_dir.join(matte.file_name().unwrap_or_default());
        log::info!("write to {}", target.display());
        trimap
            .as_image()
            .save(&target)
            .map_err(|source| TrimapToolError::Write {
                path: target.clone(),
                source,
            })?;
    }

    Ok(mattes.len())
}
