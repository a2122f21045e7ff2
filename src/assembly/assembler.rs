//! The loop joining a matcher, an image source and a reconstructor
//!
//! Unresolvable tiles are evicted from the matcher and the fragment is
//! matched again; since every eviction shrinks the pool, the loop ends
//! either with a finished canvas or with an exhausted matcher.

use crate::assembly::progress::ProgressListener;
use crate::io::configuration::DEFAULT_IMAGE_CACHE_CAPACITY;
use crate::io::error::{MosaicError, Result, invariant_violation};
use crate::matching::cache::LruCache;
use crate::matching::matcher::TileMatcher;
use crate::matching::tile::{Fragment, Tile};
use crate::raster::canvas;
use crate::reconstruction::reconstructor::Reconstructor;
use image::RgbaImage;

/// Supplier of tile images at a requested size
pub trait ImageSource {
    /// Image for `tile` at exactly `width` by `height`, `None` if the tile's
    /// backing resource cannot be used
    fn resolve(&mut self, tile: &Tile, width: u32, height: u32) -> Option<RgbaImage>;
}

/// Paints every tile as a solid block of its average colour
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidColorSource;

impl ImageSource for SolidColorSource {
    fn resolve(&mut self, tile: &Tile, width: u32, height: u32) -> Option<RgbaImage> {
        Some(canvas::solid(width, height, tile.average_argb))
    }
}

/// Decodes tiles from the file named by their source, memoising resized copies
#[derive(Debug)]
pub struct FileImageSource {
    cache: LruCache<(String, u32, u32), RgbaImage>,
}

impl Default for FileImageSource {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_CACHE_CAPACITY)
    }
}

impl FileImageSource {
    /// Create a source keeping up to `capacity` resized images
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Number of resized images currently held
    pub fn cached_images(&self) -> usize {
        self.cache.len()
    }
}

impl ImageSource for FileImageSource {
    fn resolve(&mut self, tile: &Tile, width: u32, height: u32) -> Option<RgbaImage> {
        let key = (tile.source.clone(), width, height);
        self.cache.get_or_compute(key, || match image::open(&tile.source) {
            Ok(decoded) => Some(canvas::resized(&decoded.to_rgba8(), width, height)),
            Err(error) => {
                tracing::warn!(source = %tile.source, %error, "tile image could not be decoded");
                None
            }
        })
    }
}

/// Counters of one or more assembly runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Fragments supplied to reconstructors
    pub fragments: usize,
    /// Tiles evicted because their image could not be resolved
    pub evicted_tiles: usize,
}

/// Drives reconstructors with tiles from a matcher and images from a source
#[derive(Debug)]
pub struct Assembler<S> {
    matcher: TileMatcher,
    source: S,
    stats: AssemblyStats,
}

impl<S: ImageSource> Assembler<S> {
    /// Create an assembler
    pub fn new(matcher: TileMatcher, source: S) -> Self {
        Self {
            matcher,
            source,
            stats: AssemblyStats::default(),
        }
    }

    /// The matcher, for inspection
    pub const fn matcher(&self) -> &TileMatcher {
        &self.matcher
    }

    /// The matcher, for reconfiguration between runs
    pub const fn matcher_mut(&mut self) -> &mut TileMatcher {
        &mut self.matcher
    }

    /// The image source
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Counters accumulated so far
    pub const fn stats(&self) -> AssemblyStats {
        self.stats
    }

    /// Run `reconstructor` to completion and return its canvas
    ///
    /// Progress is reported after every accepted fragment and cancellation
    /// is checked before each one.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The listener cancels the run
    /// - The matcher runs out of tiles for a fragment
    /// - The reconstructor rejects an image of the size it asked for
    /// - The reconstructor fails internally or yields no canvas
    pub fn run<R, L>(&mut self, reconstructor: &mut R, progress: &L) -> Result<RgbaImage>
    where
        R: Reconstructor + ?Sized,
        L: ProgressListener + ?Sized,
    {
        while !reconstructor.has_all() {
            if progress.is_cancelled() {
                return Err(MosaicError::Cancelled);
            }
            let Some(fragment) = reconstructor.next_fragment()? else {
                break;
            };

            let image = self.supply(&fragment)?;
            if !reconstructor.give_next(&image) {
                tracing::error!(
                    expected_width = fragment.width,
                    expected_height = fragment.height,
                    supplied_width = image.width(),
                    supplied_height = image.height(),
                    "reconstructor rejected the image it asked for"
                );
                return Err(MosaicError::RejectedImage {
                    expected: (fragment.width, fragment.height),
                    supplied: (image.width(), image.height()),
                });
            }
            self.stats.fragments += 1;
            progress.on_progress_update(reconstructor.estimated_progress_percent());
        }

        if progress.is_cancelled() {
            return Err(MosaicError::Cancelled);
        }
        let result = reconstructor
            .take_reconstructed()
            .ok_or_else(|| invariant_violation("assembler", &"reconstructor produced no canvas"))?;
        progress.on_progress_update(100);
        Ok(result)
    }

    /// Image for the best available tile, evicting tiles that cannot be resolved
    fn supply(&mut self, fragment: &Fragment) -> Result<RgbaImage> {
        loop {
            let tile = self
                .matcher
                .best_match(fragment)
                .ok_or(MosaicError::MatcherExhausted {
                    fragment: *fragment,
                })?;

            if let Some(image) = self.source.resolve(&tile, fragment.width, fragment.height) {
                return Ok(image);
            }

            tracing::warn!(source = %tile.source, "evicting tile whose image is unavailable");
            if !self.matcher.evict_tile(&tile) {
                return Err(MosaicError::MatcherExhausted {
                    fragment: *fragment,
                });
            }
            self.stats.evicted_tiles += 1;
        }
    }
}
