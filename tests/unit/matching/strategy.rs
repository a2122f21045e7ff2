//! Tests for the individual search strategies

#[cfg(test)]
mod tests {
    use tilemosaic::color::space::{ColorMetric, ColorSpace};
    use tilemosaic::matching::resolution::ResolutionSearch;
    use tilemosaic::matching::strategy::{
        KdTreeSearch, LinearSearch, MatchStrategy, RandomSearch, TRIVIAL_SOURCE_PREFIX,
        TileSearch, TrivialSearch,
    };
    use tilemosaic::matching::tile::{Fragment, Tile};

    fn palette() -> Vec<Tile> {
        vec![
            Tile::without_size("red", 0xFFFF_0000),
            Tile::without_size("green", 0xFF00_FF00),
            Tile::without_size("blue", 0xFF00_00FF),
            Tile::without_size("also-red", 0xFFFF_0000),
        ]
    }

    // Tests linear search picks the closest colour and the first on ties
    // Verified by replacing strict comparison with less-or-equal
    #[test]
    fn test_linear_search_ties() {
        let mut search = LinearSearch::new(palette());
        let space = ColorSpace::default();

        let found = search.search(&Fragment::new(1, 1, 0xFFF0_1010), &space);
        assert_eq!(found.map(|tile| tile.source), Some("red".to_string()));
    }

    // Tests linear removal preserves pool order
    #[test]
    fn test_linear_remove() {
        let mut search = LinearSearch::new(palette());
        assert!(search.remove(&Tile::without_size("red", 0)));
        assert!(!search.remove(&Tile::without_size("red", 0)));
        assert_eq!(search.len(), 3);

        let sources: Vec<_> = search.tiles().iter().map(|tile| tile.source.as_str()).collect();
        assert_eq!(sources, vec!["green", "blue", "also-red"]);

        let found = search.search(&Fragment::new(1, 1, 0xFFFF_0000), &ColorSpace::default());
        assert_eq!(found.map(|tile| tile.source), Some("also-red".to_string()));
    }

    // Tests the k-d tree search reindexes when queried with another space
    #[test]
    fn test_kd_tree_follows_space() {
        let tiles = vec![
            Tile::without_size("dark-red", 0xFF40_0000),
            Tile::without_size("mid-grey", 0xFF20_2020),
        ];
        let mut search = KdTreeSearch::new(tiles, ColorSpace::default(), 1);
        let fragment = Fragment::new(1, 1, 0xFF10_1010);

        let rgb = search.search(&fragment, &ColorSpace::default());
        assert_eq!(rgb.map(|tile| tile.source), Some("mid-grey".to_string()));

        let brightness = ColorSpace::new(ColorMetric::Brightness, false);
        let found = search.search(&fragment, &brightness);
        assert_eq!(found.map(|tile| tile.source), Some("dark-red".to_string()));
        assert_eq!(search.tree().map(|tree| tree.space()), Some(brightness));
    }

    // Tests random search only returns pool members and empties cleanly
    #[test]
    fn test_random_search() {
        let mut search = RandomSearch::new(palette(), 8);
        let fragment = Fragment::new(1, 1, 0);
        for _ in 0..20 {
            let tile = search.search(&fragment, &ColorSpace::default());
            assert!(tile.is_some_and(|tile| palette().contains(&tile)));
        }
        for tile in palette() {
            assert!(search.remove(&tile));
        }
        assert!(search.is_empty());
        assert_eq!(search.search(&fragment, &ColorSpace::default()), None);
        assert!(search.accuracy().abs() < f64::EPSILON);
    }

    // Tests trivial search echoes the fragment and cannot shrink
    #[test]
    fn test_trivial_search() {
        let mut search = TrivialSearch;
        let fragment = Fragment::new(7, 3, 0xFF12_3456);
        let tile = search.search(&fragment, &ColorSpace::default());

        assert!(tile.as_ref().is_some_and(|tile| {
            tile.source.starts_with(TRIVIAL_SOURCE_PREFIX)
                && tile.average_argb == 0xFF12_3456
                && (tile.width, tile.height) == (7, 3)
        }));
        assert!(tile.is_some_and(|tile| !search.remove(&tile)));
        assert_eq!(search.len(), 1);
    }

    // Tests strategy names and dispatch of accuracy
    #[test]
    fn test_match_strategy_dispatch() {
        let mut resolution =
            MatchStrategy::Resolution(ResolutionSearch::new(palette()).with_accuracy(0.25));
        assert_eq!(resolution.name(), "resolution");
        assert!((resolution.accuracy() - 0.25).abs() < f64::EPSILON);
        assert!(resolution.set_accuracy(0.75));
        assert!(!resolution.set_accuracy(0.75));

        let mut linear = MatchStrategy::Linear(LinearSearch::new(palette()));
        assert_eq!(linear.name(), "linear");
        assert!(!linear.set_accuracy(0.1));
        assert_eq!(linear.len(), 4);
        assert_eq!(MatchStrategy::Trivial(TrivialSearch).name(), "trivial");
    }
}
