//! Engine constants and runtime configuration defaults

// Matcher settings
/// Number of fragment to tile entries a matcher keeps cached
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;
/// Number of resized tile images an image source keeps in memory
pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 64;
/// Scaling applied to `-ln(accuracy)` when deriving the aspect ratio tolerance
pub const DEFAULT_ASPECT_TOLERANCE_SCALE: f64 = 1.0;
/// Accuracy a resolution matcher starts with
pub const DEFAULT_RESOLUTION_ACCURACY: f64 = 0.5;

// K-d tree construction
/// Smallest sample drawn when approximating a split median
pub const KD_MEDIAN_SAMPLE_MIN: usize = 10;
/// Share of the remaining tiles sampled when approximating a split median
pub const KD_MEDIAN_SAMPLE_FRACTION: f64 = 0.01;

// Reconstruction settings
/// Convex jigsaw edges protrude by this share of the cell dimension
pub const PUZZLE_NOSE_FRACTION: f64 = 0.2;
/// Fixed k-means iteration allowance
pub const KMEANS_BASE_ITERATIONS: usize = 10;
/// Additional k-means iterations granted per requested cluster
pub const KMEANS_ITERATIONS_PER_CLUSTER: usize = 2;
/// Steepness of the exponential similarity remap
pub const SIMILARITY_REMAP_STEEPNESS: f64 = 6.0;
/// Steepness of the logistic brightness contrast used by the circle pattern
pub const CIRCLE_CONTRAST_STEEPNESS: f64 = 8.0;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;
/// Default requested grid rows
pub const DEFAULT_ROWS: u32 = 32;
/// Default requested grid columns
pub const DEFAULT_COLUMNS: u32 = 32;
/// Default k-means cluster count
pub const DEFAULT_CLUSTERS: usize = 8;
/// Default merge factor for adaptive grids and region growing
pub const DEFAULT_MERGE_FACTOR: f64 = 0.3;
/// Default chain factor for region growing
pub const DEFAULT_CHAIN_FACTOR: f64 = 0.2;
/// Share of overall progress spent preparing the reconstructor vs assembling
pub const DEFAULT_PHASE_WEIGHTS: [f64; 2] = [0.1, 0.9];

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_mosaic";
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
