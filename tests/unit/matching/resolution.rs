//! Tests for the aspect-ratio aware search

#[cfg(test)]
mod tests {
    use tilemosaic::color::space::ColorSpace;
    use tilemosaic::matching::resolution::ResolutionSearch;
    use tilemosaic::matching::strategy::TileSearch;
    use tilemosaic::matching::tile::{Fragment, Tile};

    fn shaped_pool() -> Vec<Tile> {
        vec![
            Tile::new("square", 0xFF00_0000, 30, 30),
            Tile::new("tall", 0xFF00_0000, 10, 20),
            Tile::new("nearly-a", 0xFF01_0101, 20, 31),
            Tile::new("nearly-b", 0xFF02_0202, 21, 30),
            Tile::new("exact", 0xFFFF_FFFF, 20, 30),
            Tile::new("wide", 0xFF00_0000, 30, 20),
        ]
    }

    // Tests full accuracy only admits the exact ratio
    // Verified by ignoring the tolerance filter
    #[test]
    fn test_exact_ratio_wins_at_full_accuracy() {
        let mut search = ResolutionSearch::new(shaped_pool()).with_accuracy(1.0);
        let fragment = Fragment::new(2, 3, 0xFF00_0000);

        let found = search.search(&fragment, &ColorSpace::default());
        assert_eq!(found.map(|tile| tile.source), Some("exact".to_string()));
        assert!(search.tolerance().abs() < f64::EPSILON);
    }

    // Tests low accuracy lets colour decide among nearby ratios
    #[test]
    fn test_low_accuracy_prefers_colour() {
        let mut search = ResolutionSearch::new(shaped_pool()).with_accuracy(0.9);
        let fragment = Fragment::new(2, 3, 0xFF00_0000);

        let found = search.search(&fragment, &ColorSpace::default());
        assert_eq!(found.map(|tile| tile.source), Some("nearly-a".to_string()));
    }

    // Tests the closest shape is used when nothing is within tolerance
    // Verified by returning None when the tolerance filter is empty
    #[test]
    fn test_fallback_to_nearest_shape() {
        let pool = vec![
            Tile::new("square", 0xFF00_0000, 10, 10),
            Tile::new("panorama", 0xFF00_0000, 40, 10),
        ];
        let mut search = ResolutionSearch::new(pool).with_accuracy(1.0);
        let fragment = Fragment::new(3, 1, 0xFF00_0000);

        let found = search.search(&fragment, &ColorSpace::default());
        assert_eq!(found.map(|tile| tile.source), Some("panorama".to_string()));
    }

    // Tests fragments and tiles without size compete on colour alone
    #[test]
    fn test_sizeless_inputs() {
        let pool = vec![
            Tile::without_size("white", 0xFFFF_FFFF),
            Tile::without_size("black", 0xFF00_0000),
        ];
        let mut search = ResolutionSearch::new(pool).with_accuracy(1.0);

        let sized = search.search(&Fragment::new(4, 4, 0xFF10_1010), &ColorSpace::default());
        assert_eq!(sized.map(|tile| tile.source), Some("black".to_string()));

        let sizeless_fragment = Fragment::new(0, 0, 0xFFEE_EEEE);
        let found = search.search(&sizeless_fragment, &ColorSpace::default());
        assert_eq!(found.map(|tile| tile.source), Some("white".to_string()));
    }

    // Tests accuracy clamping and tolerance scaling
    #[test]
    fn test_accuracy_and_scale() {
        let mut search = ResolutionSearch::new(Vec::new());
        assert!(search.set_accuracy(3.0));
        assert!((search.accuracy() - 1.0).abs() < f64::EPSILON);
        assert!(!search.set_accuracy(f64::NAN));

        search.set_accuracy(0.5);
        let base = search.tolerance();
        assert!(search.set_tolerance_scale(2.0));
        assert!(!search.set_tolerance_scale(-2.0));
        assert!((search.tolerance() - 2.0 * base).abs() < 1e-12);
        assert!((search.tolerance_scale() - 2.0).abs() < f64::EPSILON);
    }
}
