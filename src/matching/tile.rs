//! Tile and fragment value types exchanged between matchers and reconstructors

use crate::color::argb::Argb;
use crate::raster::canvas;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A candidate image reference with precomputed average colour and size
///
/// Identity is the `source` identifier alone; a width or height of 0
/// means the dimension is unknown.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tile {
    /// Opaque identifier of the backing image, usually a file path
    pub source: String,
    /// Average colour of the backing image
    #[serde(rename = "averageARGB", with = "crate::io::catalog::signed_argb")]
    pub average_argb: Argb,
    /// Width in pixels, 0 if unknown
    #[serde(default)]
    pub width: u32,
    /// Height in pixels, 0 if unknown
    #[serde(default)]
    pub height: u32,
}

impl Tile {
    /// Create a tile
    pub fn new(source: impl Into<String>, average_argb: Argb, width: u32, height: u32) -> Self {
        Self {
            source: source.into(),
            average_argb,
            width,
            height,
        }
    }

    /// Create a tile without known dimensions
    pub fn without_size(source: impl Into<String>, average_argb: Argb) -> Self {
        Self::new(source, average_argb, 0, 0)
    }

    /// Describe a decoded image as a tile
    pub fn from_image(source: impl Into<String>, image: &RgbaImage) -> Self {
        Self::new(
            source,
            canvas::average_color(image).unwrap_or(0),
            image.width(),
            image.height(),
        )
    }

    /// Whether both dimensions are known
    pub const fn has_resolution(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width to height ratio, if both dimensions are known
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.has_resolution()
            .then(|| f64::from(self.width) / f64::from(self.height))
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Tile {}

impl Hash for Tile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

/// Request for one reconstruction slot: required size and target colour
///
/// Fragments double as cache keys, so equality covers all three fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fragment {
    /// Required image width in pixels
    pub width: u32,
    /// Required image height in pixels
    pub height: u32,
    /// Average colour the supplied image should have
    pub average_color: Argb,
}

impl Fragment {
    /// Create a fragment
    pub const fn new(width: u32, height: u32, average_color: Argb) -> Self {
        Self {
            width,
            height,
            average_color,
        }
    }

    /// Whether the fragment asks for a real resolution
    pub const fn has_resolution(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width to height ratio, if the fragment has a resolution
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.has_resolution()
            .then(|| f64::from(self.width) / f64::from(self.height))
    }

    /// Whether an image has exactly the requested dimensions
    pub fn fits(&self, image: &RgbaImage) -> bool {
        image.width() == self.width && image.height() == self.height
    }
}
