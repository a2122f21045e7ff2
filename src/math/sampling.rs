use rand::seq::index;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seeded random selector for reproducible stochastic choices
///
/// Every random decision in the engine (median sampling, random matching,
/// jigsaw edge genders, k-means seeding) goes through one of these so a
/// run can be replayed from its seed.
#[derive(Clone, Debug)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform index in `0..len`, `None` for an empty range
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.random_range(0..len))
    }

    /// Fair coin expressed as `+1` or `-1`
    pub fn sign(&mut self) -> i8 {
        if self.rng.random_bool(0.5) { 1 } else { -1 }
    }

    /// Distinct indices drawn uniformly from `0..len`, in random order
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }

    /// Generic weighted random selection
    ///
    /// Returns index into weights array using cumulative distribution. A
    /// weight vector without positive mass falls back to a uniform pick.
    pub fn weighted_choice(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().filter(|w| w.is_finite()).sum();
        if total <= 0.0 {
            return self.index(weights.len()).unwrap_or(0);
        }

        let mut remaining = self.rng.random::<f64>() * total;
        for (i, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() {
                continue;
            }
            remaining -= weight;
            if remaining <= 0.0 && weight > 0.0 {
                return i;
            }
        }
        weights
            .iter()
            .rposition(|&w| w.is_finite() && w > 0.0)
            .unwrap_or(0)
    }
}
