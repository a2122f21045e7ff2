use crate::color::space::ColorSpace;
use crate::io::configuration::DEFAULT_CACHE_CAPACITY;
use crate::matching::cache::{CacheStats, LruCache};
use crate::matching::resolution::ResolutionSearch;
use crate::matching::strategy::{
    KdTreeSearch, LinearSearch, MatchStrategy, RandomSearch, TileSearch, TrivialSearch,
};
use crate::matching::tile::{Fragment, Tile};
use std::collections::HashMap;

/// How often a tile's source may be handed out again after its first use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReuseLimit {
    /// Tiles may be reused any number of times
    #[default]
    Unlimited,
    /// Every tile is used at most once
    NoReuse,
    /// Every tile may be reused up to this many times
    Limited(u32),
}

impl ReuseLimit {
    /// Maximum reuses, `None` when unlimited
    pub const fn max_reuses(self) -> Option<u32> {
        match self {
            Self::Unlimited => None,
            Self::NoReuse => Some(0),
            Self::Limited(limit) => Some(limit),
        }
    }

    /// Parse `unlimited`, `none` or a number
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "unlimited" => Some(Self::Unlimited),
            "none" => Some(Self::NoReuse),
            number => number.parse().ok().map(Self::Limited),
        }
    }
}

/// Caching, reuse-limited front end of a search strategy
///
/// Answers are cached per fragment. With a reuse limit active every answer
/// is counted against its source; a tile that would exceed the limit is
/// removed from the pool together with every cache entry pointing at it,
/// and the lookup starts over. Each retry either returns an unconstrained
/// tile or permanently shrinks the pool, so the loop terminates.
#[derive(Debug)]
pub struct TileMatcher {
    strategy: MatchStrategy,
    space: ColorSpace,
    cache: LruCache<Fragment, Tile>,
    reuse_limit: ReuseLimit,
    use_counts: HashMap<String, u32>,
}

impl TileMatcher {
    /// Create a matcher over a strategy, indexed for the given colour space
    pub fn new(mut strategy: MatchStrategy, space: ColorSpace) -> Self {
        if let MatchStrategy::KdTree(search) = &strategy {
            if search.tree().is_some_and(|tree| tree.space() != space) {
                strategy.reindex(&space);
            }
        }
        Self {
            strategy,
            space,
            cache: LruCache::new(DEFAULT_CACHE_CAPACITY),
            reuse_limit: ReuseLimit::Unlimited,
            use_counts: HashMap::new(),
        }
    }

    /// Exhaustive colour scan over the pool
    pub fn linear(tiles: Vec<Tile>, space: ColorSpace) -> Self {
        Self::new(MatchStrategy::Linear(LinearSearch::new(tiles)), space)
    }

    /// K-d tree nearest neighbour over the pool
    pub fn kd_tree(tiles: Vec<Tile>, space: ColorSpace, seed: u64) -> Self {
        Self::new(
            MatchStrategy::KdTree(KdTreeSearch::new(tiles, space, seed)),
            space,
        )
    }

    /// Aspect-ratio filtered colour search over the pool
    pub fn resolution(tiles: Vec<Tile>, space: ColorSpace, accuracy: f64) -> Self {
        Self::new(
            MatchStrategy::Resolution(ResolutionSearch::new(tiles).with_accuracy(accuracy)),
            space,
        )
    }

    /// Random picks from the pool
    pub fn random(tiles: Vec<Tile>, seed: u64) -> Self {
        Self::new(
            MatchStrategy::Random(RandomSearch::new(tiles, seed)),
            ColorSpace::default(),
        )
    }

    /// Synthetic tiles in the queried colour
    pub fn trivial() -> Self {
        Self::new(MatchStrategy::Trivial(TrivialSearch), ColorSpace::default())
    }

    /// Replace the cache with one of a different capacity
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = LruCache::new(capacity);
        self
    }

    /// Best tile for a fragment, `None` once the pool is exhausted
    pub fn best_match(&mut self, fragment: &Fragment) -> Option<Tile> {
        loop {
            let space = self.space;
            let strategy = &mut self.strategy;
            let tile = self
                .cache
                .get_or_compute(*fragment, || strategy.search(fragment, &space))?;

            let uses = self.use_counts.entry(tile.source.clone()).or_insert(0);
            let exhausted = self
                .reuse_limit
                .max_reuses()
                .is_some_and(|max_reuses| *uses > max_reuses);
            if !exhausted {
                *uses += 1;
                return Some(tile);
            }

            tracing::debug!(source = %tile.source, uses = *uses, "tile reached its reuse limit");
            if !self.remove_tile(&tile) {
                // Synthetic tiles cannot leave the pool; hand them out regardless
                return Some(tile);
            }
        }
    }

    /// Remove a tile from the pool and drop every cache entry naming it
    pub fn remove_tile(&mut self, tile: &Tile) -> bool {
        let removed = self.strategy.remove(tile);
        if removed {
            self.cache.retain(|_, cached| cached != tile);
        }
        removed
    }

    /// Remove a tile whose image could not be produced
    ///
    /// The use counted by the `best_match` call that handed out the tile is
    /// withdrawn, so evicted tiles do not show up in `used_tiles_count`.
    pub fn evict_tile(&mut self, tile: &Tile) -> bool {
        if let Some(uses) = self.use_counts.get_mut(&tile.source) {
            *uses = uses.saturating_sub(1);
            if *uses == 0 {
                self.use_counts.remove(&tile.source);
            }
        }
        self.remove_tile(tile)
    }

    /// Accuracy of the underlying strategy
    pub fn accuracy(&self) -> f64 {
        self.strategy.accuracy()
    }

    /// Change the accuracy, clearing the cache if results may change
    pub fn set_accuracy(&mut self, accuracy: f64) {
        if self.strategy.set_accuracy(accuracy) {
            self.cache.clear();
        }
    }

    /// Change the aspect tolerance scaling of a resolution matcher
    ///
    /// Returns false for strategies without an aspect tolerance.
    pub fn set_aspect_tolerance_scale(&mut self, scale: f64) -> bool {
        let MatchStrategy::Resolution(search) = &mut self.strategy else {
            return false;
        };
        if search.set_tolerance_scale(scale) {
            self.cache.clear();
        }
        true
    }

    /// Current colour space
    pub const fn color_space(&self) -> ColorSpace {
        self.space
    }

    /// Switch alpha usage, reindexing if the space changes
    pub fn set_use_alpha(&mut self, use_alpha: bool) {
        self.set_color_space(self.space.with_alpha(use_alpha));
    }

    /// Switch colour space, reindexing and clearing the cache if it changes
    pub fn set_color_space(&mut self, space: ColorSpace) {
        if space == self.space {
            return;
        }
        self.space = space;
        self.strategy.reindex(&space);
        self.cache.clear();
        tracing::debug!(
            strategy = self.strategy.name(),
            metric = ?space.metric(),
            alpha = space.uses_alpha(),
            "colour space changed, matcher cache cleared"
        );
    }

    /// Current reuse limit
    pub const fn tile_reuse_limit(&self) -> ReuseLimit {
        self.reuse_limit
    }

    /// Change the reuse limit; counts gathered so far are kept
    pub fn set_tile_reuse_limit(&mut self, limit: ReuseLimit) {
        self.reuse_limit = limit;
    }

    /// Number of distinct tile sources handed out so far
    pub fn used_tiles_count(&self) -> usize {
        self.use_counts.values().filter(|&&uses| uses > 0).count()
    }

    /// Number of tiles left in the pool
    pub fn remaining_tiles(&self) -> usize {
        self.strategy.len()
    }

    /// Name of the underlying strategy
    pub const fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Cache effectiveness so far
    pub const fn cache_stats(&self) -> CacheStats {
        self.cache.stats
    }

    /// Number of fragments currently cached
    pub fn cached_fragments(&self) -> usize {
        self.cache.len()
    }
}
