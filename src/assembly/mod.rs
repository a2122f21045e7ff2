//! Orchestration of complete mosaic runs

/// Matcher, image source and reconstructor loop
pub mod assembler;
/// Progress listeners, trackers and the terminal bar
pub mod progress;

pub use assembler::{Assembler, ImageSource};
pub use progress::ProgressListener;
