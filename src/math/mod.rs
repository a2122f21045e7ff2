//! Mathematical utilities for matching and reconstruction

/// Monotonic remaps from user-facing factors to absolute thresholds
pub mod remap;
/// Seeded random selection for reproducible stochastic choices
pub mod sampling;
