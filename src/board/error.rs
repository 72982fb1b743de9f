//! Error types for board construction and file operations.
//!
//! None of these cross the pipeline boundary: the loaders in [`crate::board`]
//! turn every one of them into a [`Defect`](crate::board::Defect).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Intrinsic invariant violations raised by geometric constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A coordinate was NaN or infinite.
    #[error("Coordinate must be finite, got ({x}, {y})")]
    NonFinite {
        /// Offending x component.
        x: f64,
        /// Offending y component.
        y: f64,
    },

    /// A polygon was given fewer than three points.
    #[error("Polygon must have at least 3 points, got {count}")]
    TooFewPoints {
        /// Number of points supplied.
        count: usize,
    },

    /// A circle radius was zero, negative or not finite.
    #[error("Radius must be positive and finite, got {radius}")]
    InvalidRadius {
        /// Offending radius.
        radius: f64,
    },

    /// A placement rotation was outside [0, 360] degrees.
    #[error("Rotation must be between 0 and 360 degrees, got {rotation}")]
    RotationOutOfRange {
        /// Offending rotation in degrees.
        rotation: f64,
    },
}

/// Failures of [`parse_coordinates`](crate::board::shapes::parse_coordinates).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// The coordinate array was empty or not present.
    #[error("Empty coordinate array")]
    Empty,

    /// A flat `[x1, y1, x2, ...]` array had an odd number of entries.
    #[error("Flat coordinate list must have even length, got {len}")]
    OddLength {
        /// Number of entries in the array.
        len: usize,
    },

    /// The value was neither a flat numeric array nor a list of pairs.
    #[error("Unrecognized coordinate format")]
    Unrecognized,

    /// The numbers parsed but did not form a valid point.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Errors raised while reading, assembling or exporting a board.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Failed to open or read the file.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write the file.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// JSON could not be (de)serialised into the expected structure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A geometric invariant failed while assembling the board.
    #[error("{path}: {source}")]
    Geometry {
        /// JSON path of the offending field.
        path: String,
        /// The violated invariant.
        #[source]
        source: GeometryError,
    },

    /// A required coordinate field was malformed.
    #[error("{path}: {source}")]
    Coordinates {
        /// JSON path of the offending field.
        path: String,
        /// Why the coordinates were rejected.
        #[source]
        source: CoordinateError,
    },
}

impl BoardError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a geometry error located at `path`.
    pub fn geometry(path: impl Into<String>, source: GeometryError) -> Self {
        Self::Geometry {
            path: path.into(),
            source,
        }
    }

    /// Creates a coordinate error located at `path`.
    pub fn coordinates(path: impl Into<String>, source: CoordinateError) -> Self {
        Self::Coordinates {
            path: path.into(),
            source,
        }
    }
}
