//! Image loading and PNG export

use crate::io::error::{MosaicError, Result};
use image::RgbaImage;
use std::path::Path;

/// Decode an image file into RGBA pixels
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    image::open(path)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|source| MosaicError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Save an image, creating the parent directory if needed
///
/// The format follows the file extension.
///
/// # Errors
///
/// Returns an error if:
/// - The image is empty
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_png(image: &RgbaImage, output_path: &Path) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(crate::io::error::invalid_parameter(
            "image",
            &format!("{}x{}", image.width(), image.height()),
            &"cannot export an empty image",
        ));
    }

    if let Some(parent) = output_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent).map_err(|e| MosaicError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image
        .save(output_path)
        .map_err(|e| MosaicError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}
