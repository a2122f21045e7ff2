//! Aspect-ratio aware tile search
//!
//! Tiles whose aspect ratio is within a tolerance of the fragment's compete
//! on colour. The tolerance shrinks to zero as accuracy approaches one.
//! When nothing is within tolerance, the tiles with the smallest aspect
//! ratio difference compete instead, so a non-empty pool always answers.

use crate::color::space::ColorSpace;
use crate::io::configuration::{DEFAULT_ASPECT_TOLERANCE_SCALE, DEFAULT_RESOLUTION_ACCURACY};
use crate::matching::strategy::{TileSearch, closest_by_color, remove_by_source};
use crate::matching::tile::{Fragment, Tile};
use crate::math::remap::aspect_tolerance;
use num_traits::clamp;

// Absorbs rounding in ratios of exactly proportional sizes
const RATIO_EPSILON: f64 = 1e-9;

/// Search that prefers tiles shaped like the fragment
#[derive(Debug, Clone)]
pub struct ResolutionSearch {
    tiles: Vec<Tile>,
    accuracy: f64,
    tolerance_scale: f64,
}

impl ResolutionSearch {
    /// Create a resolution-aware search with the default accuracy
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            accuracy: DEFAULT_RESOLUTION_ACCURACY,
            tolerance_scale: DEFAULT_ASPECT_TOLERANCE_SCALE,
        }
    }

    /// Same search with a given accuracy
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.set_accuracy(accuracy);
        self
    }

    /// Scaling applied to `-ln(accuracy)` when deriving the tolerance
    pub const fn tolerance_scale(&self) -> f64 {
        self.tolerance_scale
    }

    /// Change the tolerance scaling, returning whether it changed
    pub fn set_tolerance_scale(&mut self, scale: f64) -> bool {
        let scale = scale.abs();
        if scale.is_finite() && (scale - self.tolerance_scale).abs() > f64::EPSILON {
            self.tolerance_scale = scale;
            true
        } else {
            false
        }
    }

    /// Current absolute aspect ratio tolerance
    pub fn tolerance(&self) -> f64 {
        aspect_tolerance(self.accuracy, self.tolerance_scale)
    }

    fn ratio_difference(tile: &Tile, wanted: f64) -> f64 {
        tile.aspect_ratio()
            .map_or(f64::INFINITY, |ratio| (ratio - wanted).abs())
    }
}

impl TileSearch for ResolutionSearch {
    fn search(&mut self, fragment: &Fragment, space: &ColorSpace) -> Option<Tile> {
        let target = fragment.average_color;
        let Some(wanted) = fragment.aspect_ratio() else {
            return closest_by_color(&self.tiles, target, space).cloned();
        };

        let tolerance = self.tolerance() + RATIO_EPSILON;
        let within = self
            .tiles
            .iter()
            .filter(|tile| Self::ratio_difference(tile, wanted) <= tolerance);
        if let Some(tile) = closest_by_color(within, target, space) {
            return Some(tile.clone());
        }

        let smallest = self
            .tiles
            .iter()
            .map(|tile| Self::ratio_difference(tile, wanted))
            .fold(f64::INFINITY, f64::min);
        // Unknown shapes compare as infinitely far, which still ties among themselves
        let nearest_shape = self
            .tiles
            .iter()
            .filter(|tile| Self::ratio_difference(tile, wanted) <= smallest + RATIO_EPSILON);
        closest_by_color(nearest_shape, target, space).cloned()
    }

    fn remove(&mut self, tile: &Tile) -> bool {
        remove_by_source(&mut self.tiles, tile)
    }

    fn reindex(&mut self, _space: &ColorSpace) {}

    fn accuracy(&self) -> f64 {
        self.accuracy
    }

    fn set_accuracy(&mut self, accuracy: f64) -> bool {
        if accuracy.is_nan() {
            return false;
        }
        let accuracy = clamp(accuracy, 0.0, 1.0);
        let changed = (accuracy - self.accuracy).abs() > f64::EPSILON;
        self.accuracy = accuracy;
        changed
    }

    fn len(&self) -> usize {
        self.tiles.len()
    }
}
