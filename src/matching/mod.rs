//! Tile matching: value types, search strategies and the caching matcher
//!
//! A [`TileMatcher`] answers [`Fragment`] requests with the best [`Tile`]
//! from its pool. It owns one [`MatchStrategy`], caches answers per fragment
//! and enforces an optional per-source [`ReuseLimit`].

/// Capacity-bounded LRU cache with hit statistics
pub mod cache;
/// Arena k-d tree over tile colours
pub mod kdtree;
/// Caching, reuse-limited matcher front end
pub mod matcher;
/// Aspect-ratio aware search
pub mod resolution;
/// Search strategies and their common interface
pub mod strategy;
/// Tile and fragment value types
pub mod tile;

pub use matcher::{ReuseLimit, TileMatcher};
pub use strategy::{MatchStrategy, TileSearch};
pub use tile::{Fragment, Tile};
