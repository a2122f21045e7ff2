//! Monotonic remaps from 0..1 user factors to absolute thresholds
//!
//! Similarity and accuracy knobs are exposed as factors in `0..=1`; the
//! engine works with absolute colour distances and aspect ratio deltas.

use crate::io::configuration::SIMILARITY_REMAP_STEEPNESS;
use num_traits::clamp;

/// Map a similarity factor onto an absolute colour distance bound
///
/// The remap is exponential so that the lower half of the factor range
/// stays fine grained: `0` only admits identical colours and `1` admits
/// every pair up to `max_value`.
pub fn similarity_bound(factor: f64, max_value: u64) -> u64 {
    let factor = if factor.is_nan() {
        0.0
    } else {
        clamp(factor, 0.0, 1.0)
    };
    let steepness = SIMILARITY_REMAP_STEEPNESS;
    let scaled = (steepness * factor).exp_m1() / steepness.exp_m1();
    (scaled * max_value as f64).round() as u64
}

/// Logistic contrast curve over `0..=255` values centred on `center`
///
/// Values near `center` spread apart, values far from it saturate
/// towards 0 or 255.
pub fn logistic_contrast(value: f64, center: f64, steepness: f64) -> f64 {
    let normalized = (value - center) / 255.0;
    255.0 / (1.0 + (-steepness * normalized).exp())
}

/// Aspect ratio tolerance derived from a matcher accuracy
///
/// Decreases monotonically to zero as `accuracy` approaches one and grows
/// without bound as it approaches zero.
pub fn aspect_tolerance(accuracy: f64, scale: f64) -> f64 {
    if accuracy.is_nan() || accuracy <= 0.0 {
        return f64::INFINITY;
    }
    if accuracy >= 1.0 {
        return 0.0;
    }
    scale.abs() * -accuracy.ln()
}
