//! Reconstruction strategies
//!
//! Every strategy implements [`Reconstructor`]: it splits a source image
//! into fragments, accepts one supplied image per fragment and paints the
//! result canvas. [`AnyReconstructor`] is the closed set the binary picks
//! from.

/// Region-growing layers from chains of similar pixels
pub mod auto_layer;
/// K-means colour cluster layers
pub mod fixed_layer;
/// Uniform grid geometry and the plain grid reconstructor
pub mod grid;
/// Grid with adaptive merging of similar cells
pub mod multi_rect;
/// Halftone circle and brick pattern variants of the grid
pub mod pattern;
/// Jigsaw pieces with interlocking noses
pub mod puzzle;
/// The reconstruction protocol and strategy dispatch
pub mod reconstructor;

pub use reconstructor::{AnyReconstructor, Reconstructor};
