//! Tests for seeded random selection

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use tilemosaic::math::sampling::RandomSelector;

    // Tests equal seeds replay the same choices
    #[test]
    fn test_reproducible() {
        let mut first = RandomSelector::new(7);
        let mut second = RandomSelector::new(7);
        for _ in 0..32 {
            assert_eq!(first.index(1000), second.index(1000));
            assert_eq!(first.sign(), second.sign());
        }
    }

    // Tests index range and empty range
    #[test]
    fn test_index_range() {
        let mut selector = RandomSelector::new(1);
        assert_eq!(selector.index(0), None);
        for _ in 0..100 {
            assert!(selector.index(5).is_some_and(|i| i < 5));
        }
    }

    // Tests sample indices are distinct and capped by the length
    #[test]
    fn test_sample_indices() {
        let mut selector = RandomSelector::new(3);
        let sample = selector.sample_indices(50, 10);
        let distinct: HashSet<_> = sample.iter().copied().collect();
        assert_eq!(sample.len(), 10);
        assert_eq!(distinct.len(), 10);
        assert!(sample.iter().all(|&i| i < 50));

        assert_eq!(selector.sample_indices(4, 10).len(), 4);
    }

    // Tests weighted choice never picks zero weights
    // Verified by accepting the first index unconditionally
    #[test]
    fn test_weighted_choice_skips_zero() {
        let mut selector = RandomSelector::new(11);
        for _ in 0..200 {
            let choice = selector.weighted_choice(&[0.0, 1.0, 0.0, 3.0]);
            assert!(choice == 1 || choice == 3);
        }
    }

    // Tests weights without mass fall back to a uniform pick
    #[test]
    fn test_weighted_choice_without_mass() {
        let mut selector = RandomSelector::new(5);
        for _ in 0..50 {
            assert!(selector.weighted_choice(&[0.0, 0.0, 0.0]) < 3);
        }
        assert_eq!(selector.weighted_choice(&[]), 0);
    }
}
