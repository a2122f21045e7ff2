//! Colour handling for matching and reconstruction
//!
//! Colours travel through the engine as packed `0xAARRGGBB` integers. This
//! module contains:
//! - Channel access and averaging for packed colours
//! - Colour spaces mapping packed colours to points, with their metrics

/// Packed ARGB channel helpers and colour averaging
pub mod argb;
/// Colour spaces, axes and distance metrics
pub mod space;

pub use argb::Argb;
pub use space::{Axis, ColorMetric, ColorPoint, ColorSpace};
