use image::ImageError;
use std::path::Path;

use crate::report::ItemError;

/// Rotate the raster image at `src` by 180 degrees and save it to `dest`.
///
/// The output format follows the extension of `dest`.
pub fn rotate_png(src: &Path, dest: &Path) -> Result<(), ItemError> {
    let img = image::open(src).map_err(|err| match err {
        ImageError::IoError(source) => ItemError::Read {
            path: src.to_path_buf(),
            source,
        },
        source => ItemError::Decode {
            path: src.to_path_buf(),
            source,
        },
    })?;

    img.rotate180().save(dest).map_err(|err| match err {
        ImageError::IoError(source) => ItemError::Write {
            path: dest.to_path_buf(),
            source,
        },
        source => ItemError::Encode {
            path: dest.to_path_buf(),
            source,
        },
    })
}
