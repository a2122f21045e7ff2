//! Tests for similarity, contrast and aspect tolerance remaps

#[cfg(test)]
mod tests {
    use tilemosaic::math::remap::{aspect_tolerance, logistic_contrast, similarity_bound};

    // Tests the end points of the similarity remap
    #[test]
    fn test_similarity_bound_limits() {
        assert_eq!(similarity_bound(0.0, 1000), 0);
        assert_eq!(similarity_bound(1.0, 1000), 1000);
        assert_eq!(similarity_bound(-3.0, 1000), 0);
        assert_eq!(similarity_bound(7.0, 1000), 1000);
        assert_eq!(similarity_bound(f64::NAN, 1000), 0);
    }

    // Tests the remap is monotonic and favours small factors
    // Verified by replacing the exponential with a linear map
    #[test]
    fn test_similarity_bound_shape() {
        let max = 195_075;
        let mut previous = 0;
        for step in 1..=20 {
            let bound = similarity_bound(f64::from(step) / 20.0, max);
            assert!(bound >= previous);
            previous = bound;
        }
        assert!(similarity_bound(0.5, max) < max / 2);
    }

    // Tests contrast curve is centred and saturates
    #[test]
    fn test_logistic_contrast() {
        assert!((logistic_contrast(100.0, 100.0, 8.0) - 127.5).abs() < 1e-9);
        assert!(logistic_contrast(255.0, 0.0, 8.0) > 254.0);
        assert!(logistic_contrast(0.0, 255.0, 8.0) < 1.0);
        assert!(logistic_contrast(120.0, 100.0, 8.0) > logistic_contrast(110.0, 100.0, 8.0));
    }

    // Tests aspect tolerance bounds and monotonicity
    // Verified by dropping the sign of the logarithm
    #[test]
    fn test_aspect_tolerance() {
        assert!(aspect_tolerance(0.0, 1.0).is_infinite());
        assert!(aspect_tolerance(f64::NAN, 1.0).is_infinite());
        assert!(aspect_tolerance(1.0, 1.0).abs() < f64::EPSILON);
        assert!(aspect_tolerance(0.3, 1.0) > aspect_tolerance(0.6, 1.0));
        assert!((aspect_tolerance(0.5, 2.0) - 2.0 * 2.0_f64.ln()).abs() < 1e-12);
    }
}
