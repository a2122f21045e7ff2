//! JSON tile catalogs
//!
//! Format: `{"tiles": [{"source": "...", "averageARGB": -16777216, "width": 64, "height": 48}]}`.
//! Colours are stored as signed 32-bit integers; unknown fields are ignored
//! and missing dimensions read as 0.

use crate::io::error::{MosaicError, Result};
use crate::io::image::load_image;
use crate::matching::tile::Tile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serde adapter storing packed ARGB as a signed 32-bit integer
pub mod signed_argb {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Write the colour as its two's complement `i32`
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer fails.
    pub fn serialize<S: Serializer>(color: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(*color as i32)
    }

    /// Read any integer, keeping its low 32 bits
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        i64::deserialize(deserializer).map(|value| value as u32)
    }
}

/// A pool of tiles as persisted on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCatalog {
    /// Catalogued tiles
    pub tiles: Vec<Tile>,
}

impl TileCatalog {
    /// Parse a catalog from JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid catalog.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the catalog as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a catalog file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| MosaicError::FileSystem {
            path: path.to_path_buf(),
            operation: "read catalog",
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| MosaicError::Catalog {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Write the catalog to a file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or any file operation fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|source| MosaicError::Catalog {
            path: Some(path.to_path_buf()),
            source,
        })?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| MosaicError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source,
            })?;
        }
        fs::write(path, text).map_err(|source| MosaicError::FileSystem {
            path: path.to_path_buf(),
            operation: "write catalog",
            source,
        })
    }

    /// Describe image files as tiles, using each path as the tile source
    ///
    /// # Errors
    ///
    /// Returns an error if any image cannot be decoded.
    pub fn from_image_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let tiles = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let image = load_image(path)?;
                Ok(Tile::from_image(path.to_string_lossy(), &image))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { tiles })
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the catalog has no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
