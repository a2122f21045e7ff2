//! Input/output: catalogs, images, configuration, errors and the command line

/// Tile catalog persistence as JSON
pub mod catalog;
/// Command-line parsing and subcommand execution
pub mod cli;
/// Default parameters and tuning constants
pub mod configuration;
/// Error type shared by the whole crate
pub mod error;
/// Image decoding and export
pub mod image;
/// Tracing subscriber installation
pub mod logging;
