//! Tests for the caching, reuse-limited matcher

#[cfg(test)]
mod tests {
    use tilemosaic::color::space::{ColorMetric, ColorSpace};
    use tilemosaic::matching::matcher::{ReuseLimit, TileMatcher};
    use tilemosaic::matching::tile::{Fragment, Tile};

    fn greys() -> Vec<Tile> {
        (0..4)
            .map(|i| {
                let level = 0x40 * i;
                Tile::without_size(
                    format!("grey-{i}"),
                    0xFF00_0000 | (level << 16) | (level << 8) | level,
                )
            })
            .collect()
    }

    fn source(tile: Option<Tile>) -> Option<String> {
        tile.map(|tile| tile.source)
    }

    // Tests repeated queries are answered from the cache
    #[test]
    fn test_cache_hits() {
        let mut matcher = TileMatcher::linear(greys(), ColorSpace::default());
        let fragment = Fragment::new(8, 8, 0xFF45_4545);

        let first = matcher.best_match(&fragment);
        let second = matcher.best_match(&fragment);
        assert_eq!(first, second);
        assert_eq!(source(first), Some("grey-1".to_string()));
        assert_eq!(matcher.cache_stats().hits, 1);
        assert_eq!(matcher.cache_stats().misses, 1);
        assert_eq!(matcher.cached_fragments(), 1);
    }

    // Tests a single-use limit walks through the pool and then runs dry
    // Verified by counting uses without removing exhausted tiles
    #[test]
    fn test_no_reuse_exhausts_pool() {
        let mut matcher = TileMatcher::linear(greys(), ColorSpace::default());
        matcher.set_tile_reuse_limit(ReuseLimit::NoReuse);
        let fragment = Fragment::new(1, 1, 0xFF00_0000);

        let order: Vec<_> = (0..4).filter_map(|_| source(matcher.best_match(&fragment))).collect();
        assert_eq!(order, vec!["grey-0", "grey-1", "grey-2", "grey-3"]);
        assert_eq!(matcher.best_match(&fragment), None);
        assert_eq!(matcher.used_tiles_count(), 4);
    }

    // Tests a limit of N allows N reuses after the first use
    #[test]
    fn test_limited_reuse() {
        let mut matcher = TileMatcher::kd_tree(greys(), ColorSpace::default(), 9);
        matcher.set_tile_reuse_limit(ReuseLimit::Limited(2));
        let fragment = Fragment::new(1, 1, 0xFFFF_FFFF);

        for _ in 0..3 {
            assert_eq!(source(matcher.best_match(&fragment)), Some("grey-3".to_string()));
        }
        assert_eq!(source(matcher.best_match(&fragment)), Some("grey-2".to_string()));
        assert_eq!(matcher.remaining_tiles(), 3);
    }

    // Tests removal drops the tile and its cache entries
    #[test]
    fn test_remove_tile_invalidates_cache() {
        let mut matcher = TileMatcher::linear(greys(), ColorSpace::default());
        let fragment = Fragment::new(2, 2, 0xFF80_8080);
        assert_eq!(source(matcher.best_match(&fragment)), Some("grey-2".to_string()));

        assert!(matcher.remove_tile(&Tile::without_size("grey-2", 0)));
        assert!(!matcher.remove_tile(&Tile::without_size("grey-2", 0)));
        assert_eq!(matcher.cached_fragments(), 0);
        assert_ne!(source(matcher.best_match(&fragment)), Some("grey-2".to_string()));
    }

    // Tests changing the colour space clears the cache only on change
    #[test]
    fn test_color_space_change() {
        let mut matcher = TileMatcher::linear(greys(), ColorSpace::default());
        matcher.best_match(&Fragment::new(1, 1, 0xFF00_0000));

        matcher.set_use_alpha(false);
        assert_eq!(matcher.cached_fragments(), 1);

        matcher.set_color_space(ColorSpace::new(ColorMetric::Brightness, false));
        assert_eq!(matcher.cached_fragments(), 0);
        assert_eq!(matcher.color_space().metric(), ColorMetric::Brightness);
    }

    // Tests trivial matcher never exhausts, even without reuse
    #[test]
    fn test_trivial_ignores_reuse_limit() {
        let mut matcher = TileMatcher::trivial();
        matcher.set_tile_reuse_limit(ReuseLimit::NoReuse);
        let fragment = Fragment::new(3, 3, 0xFF12_3456);

        for _ in 0..3 {
            let tile = matcher.best_match(&fragment);
            assert!(tile.is_some_and(|tile| tile.average_argb == 0xFF12_3456));
        }
        assert_eq!(matcher.strategy_name(), "trivial");
    }

    // Tests accuracy and tolerance settings reach the resolution strategy
    #[test]
    fn test_resolution_settings() {
        let mut matcher = TileMatcher::resolution(greys(), ColorSpace::default(), 0.3);
        assert!((matcher.accuracy() - 0.3).abs() < f64::EPSILON);
        matcher.best_match(&Fragment::new(4, 4, 0));

        matcher.set_accuracy(0.8);
        assert!((matcher.accuracy() - 0.8).abs() < f64::EPSILON);
        assert_eq!(matcher.cached_fragments(), 0);
        assert!(matcher.set_aspect_tolerance_scale(3.0));

        let mut linear = TileMatcher::linear(greys(), ColorSpace::default());
        assert!(!linear.set_aspect_tolerance_scale(3.0));
    }

    // Tests a disabled cache still answers every query
    #[test]
    fn test_zero_cache_capacity() {
        let mut matcher =
            TileMatcher::linear(greys(), ColorSpace::default()).with_cache_capacity(0);
        let fragment = Fragment::new(1, 1, 0xFFC0_C0C0);
        for _ in 0..3 {
            assert_eq!(source(matcher.best_match(&fragment)), Some("grey-3".to_string()));
        }
        assert_eq!(matcher.cached_fragments(), 0);
    }

    // Tests reuse limit parsing
    #[test]
    fn test_reuse_limit_from_name() {
        assert_eq!(ReuseLimit::from_name("unlimited"), Some(ReuseLimit::Unlimited));
        assert_eq!(ReuseLimit::from_name("none"), Some(ReuseLimit::NoReuse));
        assert_eq!(ReuseLimit::from_name("5"), Some(ReuseLimit::Limited(5)));
        assert_eq!(ReuseLimit::from_name("-1"), None);
        assert_eq!(ReuseLimit::NoReuse.max_reuses(), Some(0));
        assert_eq!(ReuseLimit::Unlimited.max_reuses(), None);
    }

    // Tests evicting a freshly matched tile withdraws its use
    // Verified by removing the tile without adjusting its count
    #[test]
    fn test_evict_tile_withdraws_use() {
        let mut matcher = TileMatcher::linear(greys(), ColorSpace::default());
        let dark = Fragment::new(1, 1, 0xFF05_0505);
        let light = Fragment::new(1, 1, 0xFFC0_C0C0);

        let evicted = matcher.best_match(&dark).unwrap();
        assert_eq!(matcher.used_tiles_count(), 1);
        assert!(matcher.evict_tile(&evicted));
        assert_eq!(matcher.used_tiles_count(), 0);
        assert_eq!(matcher.remaining_tiles(), 3);

        assert_eq!(source(matcher.best_match(&dark)), Some("grey-1".to_string()));
        assert_eq!(source(matcher.best_match(&light)), Some("grey-3".to_string()));
        assert_eq!(matcher.used_tiles_count(), 2);
        assert!(!matcher.evict_tile(&evicted));
    }
}
