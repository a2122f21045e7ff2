//! Error types for matching, reconstruction and catalog operations

use crate::matching::tile::Fragment;
use std::fmt;
use std::path::PathBuf;

/// Main error type for all mosaic operations
#[derive(Debug)]
pub enum MosaicError {
    /// Failed to load an image from the filesystem
    ImageLoad {
        /// Image that could not be decoded
        path: PathBuf,
        /// Decoder failure
        source: image::ImageError,
    },

    /// Failed to save the reconstructed image to disk
    ImageExport {
        /// Destination of the export
        path: PathBuf,
        /// Encoder failure
        source: image::ImageError,
    },

    /// Reading, writing or creating a path failed
    FileSystem {
        /// Path the operation touched
        path: PathBuf,
        /// Short name of the failed operation
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Tile catalog could not be encoded or decoded
    Catalog {
        /// Path of the catalog, if it came from disk
        path: Option<PathBuf>,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Construction parameter validation failed
    InvalidParameter {
        /// Parameter name as exposed to callers
        parameter: &'static str,
        /// Rejected value, rendered as text
        value: String,
        /// Constraint the value violates
        reason: String,
    },

    /// No tile is left in the matcher's pool to serve a fragment
    MatcherExhausted {
        /// The fragment that could not be served
        fragment: Fragment,
    },

    /// A reconstructor refused an image it requested itself
    ///
    /// This is an orchestration defect rather than a recoverable failure.
    RejectedImage {
        /// Dimensions of the fragment that was issued
        expected: (u32, u32),
        /// Dimensions of the image that was supplied
        supplied: (u32, u32),
    },

    /// The run was cancelled through its progress listener
    Cancelled,

    /// An internal bookkeeping invariant was broken
    InvariantViolation {
        /// Component whose invariant failed
        component: &'static str,
        /// Description of the broken invariant
        reason: String,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Catalog { path, source } => match path {
                Some(path) => write!(f, "Invalid tile catalog '{}': {source}", path.display()),
                None => write!(f, "Invalid tile catalog: {source}"),
            },
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::MatcherExhausted { fragment } => {
                write!(
                    f,
                    "No tile left to match fragment {}x{} #{:08X}",
                    fragment.width, fragment.height, fragment.average_color
                )
            }
            Self::RejectedImage { expected, supplied } => {
                write!(
                    f,
                    "Reconstructor rejected a {}x{} image for a {}x{} fragment",
                    supplied.0, supplied.1, expected.0, expected.1
                )
            }
            Self::Cancelled => write!(f, "Reconstruction was cancelled"),
            Self::InvariantViolation { component, reason } => {
                write!(f, "Invariant violated in {component}: {reason}")
            }
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Catalog { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for mosaic results
pub type Result<T> = std::result::Result<T, MosaicError>;

impl From<image::ImageError> for MosaicError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<serde_json::Error> for MosaicError {
    fn from(err: serde_json::Error) -> Self {
        Self::Catalog {
            path: None,
            source: err,
        }
    }
}

impl MosaicError {
    /// Whether the error ends a run without any result being available
    ///
    /// Cancellation and exhaustion are expected outcomes of a run; every
    /// other variant points at bad input or a defect.
    pub const fn is_run_failure(&self) -> bool {
        matches!(self, Self::Cancelled | Self::MatcherExhausted { .. })
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invariant violation error
pub fn invariant_violation(component: &'static str, reason: &impl ToString) -> MosaicError {
    MosaicError::InvariantViolation {
        component,
        reason: reason.to_string(),
    }
}
