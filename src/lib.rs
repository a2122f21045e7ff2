//! Photo mosaic reconstruction from a pool of candidate tile images
//!
//! A source image is split into fragments by a reconstruction strategy, each
//! fragment is answered with the closest tile from a matcher, and the tile
//! images are painted back into a result canvas of the source's size.

#![forbid(unsafe_code)]

/// Orchestration of matcher, image source and reconstructor, with progress
pub mod assembly;
/// Packed ARGB colours, colour spaces and distance metrics
pub mod color;
/// Input/output operations, configuration and error handling
pub mod io;
/// Tile search strategies and the caching matcher
pub mod matching;
/// Similarity remaps and seeded random selection
pub mod math;
/// Pixel-level drawing helpers
pub mod raster;
/// Strategies splitting a source image into fragments and painting results
pub mod reconstruction;

pub use io::error::{MosaicError, Result};
