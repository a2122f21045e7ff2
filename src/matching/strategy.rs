//! Tile search strategies behind the caching matcher
//!
//! Each strategy owns its tile pool and knows how to search it, shrink it
//! and reindex it when the colour space changes. [`MatchStrategy`] is the
//! closed set of strategies a [`TileMatcher`](crate::matching::TileMatcher)
//! dispatches to.

use crate::color::space::ColorSpace;
use crate::matching::kdtree::KdColorTree;
use crate::matching::resolution::ResolutionSearch;
use crate::matching::tile::{Fragment, Tile};
use crate::math::sampling::RandomSelector;

/// Operations every search strategy provides
pub trait TileSearch {
    /// Best tile for the fragment, `None` when the pool is empty
    fn search(&mut self, fragment: &Fragment, space: &ColorSpace) -> Option<Tile>;

    /// Remove a tile from the pool, returning whether it was present
    fn remove(&mut self, tile: &Tile) -> bool;

    /// Rebuild any colour-space dependent index
    fn reindex(&mut self, space: &ColorSpace);

    /// How strictly secondary constraints are enforced, in `0..=1`
    fn accuracy(&self) -> f64;

    /// Change the accuracy, returning whether search results may change
    fn set_accuracy(&mut self, accuracy: f64) -> bool;

    /// Number of tiles left in the pool
    fn len(&self) -> usize;

    /// Whether the pool is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Closest tile by colour, first one wins ties
pub(crate) fn closest_by_color<'a, I>(tiles: I, target: u32, space: &ColorSpace) -> Option<&'a Tile>
where
    I: IntoIterator<Item = &'a Tile>,
{
    let mut best: Option<(&Tile, u64)> = None;
    for tile in tiles {
        let distance = space.distance(tile.average_argb, target);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((tile, distance));
        }
    }
    best.map(|(tile, _)| tile)
}

pub(crate) fn remove_by_source(tiles: &mut Vec<Tile>, tile: &Tile) -> bool {
    match tiles.iter().position(|candidate| candidate == tile) {
        Some(index) => {
            tiles.remove(index);
            true
        }
        None => false,
    }
}

/// Exhaustive scan minimising colour distance; the correctness baseline
#[derive(Debug, Clone, Default)]
pub struct LinearSearch {
    tiles: Vec<Tile>,
}

impl LinearSearch {
    /// Create a linear search over the given pool
    pub const fn new(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    /// Tiles left in the pool
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

impl TileSearch for LinearSearch {
    fn search(&mut self, fragment: &Fragment, space: &ColorSpace) -> Option<Tile> {
        closest_by_color(&self.tiles, fragment.average_color, space).cloned()
    }

    fn remove(&mut self, tile: &Tile) -> bool {
        remove_by_source(&mut self.tiles, tile)
    }

    fn reindex(&mut self, _space: &ColorSpace) {}

    fn accuracy(&self) -> f64 {
        1.0
    }

    fn set_accuracy(&mut self, _accuracy: f64) -> bool {
        false
    }

    fn len(&self) -> usize {
        self.tiles.len()
    }
}

/// Nearest neighbour search through a colour k-d tree
#[derive(Debug)]
pub struct KdTreeSearch {
    tree: Option<KdColorTree>,
    selector: RandomSelector,
}

impl KdTreeSearch {
    /// Index the pool under the given colour space
    pub fn new(tiles: Vec<Tile>, space: ColorSpace, seed: u64) -> Self {
        let mut selector = RandomSelector::new(seed);
        let tree = KdColorTree::build(tiles, space, &mut selector);
        Self {
            tree: Some(tree),
            selector,
        }
    }

    /// Underlying tree
    pub const fn tree(&self) -> Option<&KdColorTree> {
        self.tree.as_ref()
    }
}

impl TileSearch for KdTreeSearch {
    fn search(&mut self, fragment: &Fragment, space: &ColorSpace) -> Option<Tile> {
        if self.tree.as_ref().is_some_and(|tree| tree.space() != *space) {
            self.reindex(space);
        }
        self.tree
            .as_ref()
            .and_then(|tree| tree.nearest(fragment.average_color))
            .cloned()
    }

    fn remove(&mut self, tile: &Tile) -> bool {
        self.tree.as_mut().is_some_and(|tree| tree.remove(tile))
    }

    fn reindex(&mut self, space: &ColorSpace) {
        let tiles = self.tree.take().map(KdColorTree::into_tiles).unwrap_or_default();
        self.tree = Some(KdColorTree::build(tiles, *space, &mut self.selector));
    }

    fn accuracy(&self) -> f64 {
        1.0
    }

    fn set_accuracy(&mut self, _accuracy: f64) -> bool {
        false
    }

    fn len(&self) -> usize {
        self.tree.as_ref().map_or(0, KdColorTree::len)
    }
}

/// Uniform random pick that ignores colour
#[derive(Debug, Clone)]
pub struct RandomSearch {
    tiles: Vec<Tile>,
    selector: RandomSelector,
}

impl RandomSearch {
    /// Create a random search over the given pool
    pub fn new(tiles: Vec<Tile>, seed: u64) -> Self {
        Self {
            tiles,
            selector: RandomSelector::new(seed),
        }
    }
}

impl TileSearch for RandomSearch {
    fn search(&mut self, _fragment: &Fragment, _space: &ColorSpace) -> Option<Tile> {
        let index = self.selector.index(self.tiles.len())?;
        self.tiles.get(index).cloned()
    }

    fn remove(&mut self, tile: &Tile) -> bool {
        match self.tiles.iter().position(|candidate| candidate == tile) {
            Some(index) => {
                self.tiles.swap_remove(index);
                true
            }
            None => false,
        }
    }

    fn reindex(&mut self, _space: &ColorSpace) {}

    fn accuracy(&self) -> f64 {
        0.0
    }

    fn set_accuracy(&mut self, _accuracy: f64) -> bool {
        false
    }

    fn len(&self) -> usize {
        self.tiles.len()
    }
}

/// Synthetic match that always reports the queried colour and size
///
/// Used by pattern reconstructors which paint shapes from the fragment
/// colour instead of pasting photographs. Its tiles cannot be removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialSearch;

/// Prefix of the source identifier of synthetic tiles
pub const TRIVIAL_SOURCE_PREFIX: &str = "trivial:";

impl TrivialSearch {
    /// The synthetic tile answering a fragment
    pub fn tile_for(fragment: &Fragment) -> Tile {
        Tile::new(
            format!("{TRIVIAL_SOURCE_PREFIX}{:08X}", fragment.average_color),
            fragment.average_color,
            fragment.width,
            fragment.height,
        )
    }
}

impl TileSearch for TrivialSearch {
    fn search(&mut self, fragment: &Fragment, _space: &ColorSpace) -> Option<Tile> {
        Some(Self::tile_for(fragment))
    }

    fn remove(&mut self, _tile: &Tile) -> bool {
        false
    }

    fn reindex(&mut self, _space: &ColorSpace) {}

    fn accuracy(&self) -> f64 {
        1.0
    }

    fn set_accuracy(&mut self, _accuracy: f64) -> bool {
        false
    }

    fn len(&self) -> usize {
        1
    }
}

/// Closed set of search strategies
#[derive(Debug)]
pub enum MatchStrategy {
    /// Exhaustive colour scan
    Linear(LinearSearch),
    /// K-d tree nearest neighbour
    KdTree(KdTreeSearch),
    /// Aspect ratio filter, then colour
    Resolution(ResolutionSearch),
    /// Uniform random pick
    Random(RandomSearch),
    /// Synthetic tiles in the queried colour
    Trivial(TrivialSearch),
}

impl MatchStrategy {
    /// Short strategy name for diagnostics
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::KdTree(_) => "kd-tree",
            Self::Resolution(_) => "resolution",
            Self::Random(_) => "random",
            Self::Trivial(_) => "trivial",
        }
    }

    fn as_search(&self) -> &dyn TileSearch {
        match self {
            Self::Linear(search) => search,
            Self::KdTree(search) => search,
            Self::Resolution(search) => search,
            Self::Random(search) => search,
            Self::Trivial(search) => search,
        }
    }

    fn as_search_mut(&mut self) -> &mut dyn TileSearch {
        match self {
            Self::Linear(search) => search,
            Self::KdTree(search) => search,
            Self::Resolution(search) => search,
            Self::Random(search) => search,
            Self::Trivial(search) => search,
        }
    }
}

impl TileSearch for MatchStrategy {
    fn search(&mut self, fragment: &Fragment, space: &ColorSpace) -> Option<Tile> {
        self.as_search_mut().search(fragment, space)
    }

    fn remove(&mut self, tile: &Tile) -> bool {
        self.as_search_mut().remove(tile)
    }

    fn reindex(&mut self, space: &ColorSpace) {
        self.as_search_mut().reindex(space);
    }

    fn accuracy(&self) -> f64 {
        self.as_search().accuracy()
    }

    fn set_accuracy(&mut self, accuracy: f64) -> bool {
        self.as_search_mut().set_accuracy(accuracy)
    }

    fn len(&self) -> usize {
        self.as_search().len()
    }
}
