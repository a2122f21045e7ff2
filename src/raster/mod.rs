//! Raster collaborators over `image::RgbaImage`

/// Fill, paste, resize and blend helpers
pub mod canvas;
