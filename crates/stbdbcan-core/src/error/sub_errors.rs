//! Sub-error types for stbdbcan-core.
//!
//! Each error type covers a specific domain of failures.

use thiserror::Error;

use crate::types::EntityId;

// ============================================================================
// INPUT ERROR
// ============================================================================

/// Errors raised while loading or validating input data.
///
/// Always fatal: reported to the caller before any computation starts.
#[derive(Debug, Error)]
pub enum InputError {
    /// File could not be opened or read.
    #[error("Failed to read '{path}': {message}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// CSV layer rejected the file (bad quoting, invalid UTF-8, ...).
    #[error("Malformed CSV in '{path}': {message}")]
    Csv {
        /// Path that failed
        path: String,
        /// Underlying parser message
        message: String,
    },

    /// A required column is not present in the header.
    #[error("Column '{column}' not found in header of '{path}'")]
    MissingColumn {
        /// Path of the file
        path: String,
        /// Name of the column that was looked up
        column: String,
    },

    /// A declared behavioral attribute is not a dataset column.
    #[error("Unknown behavioral attribute '{name}'")]
    UnknownAttribute {
        /// Attribute name as declared by the caller
        name: String,
    },

    /// Row has a different number of fields than the header.
    #[error("Row {row} of '{path}' has {found} fields, expected {expected}")]
    ColumnCount {
        /// Path of the file
        path: String,
        /// 1-based data row number
        row: usize,
        /// Field count of the header
        expected: usize,
        /// Field count of the row
        found: usize,
    },

    /// A numeric field could not be parsed or is not finite.
    #[error("Row {row} of '{path}': column '{column}' has invalid number '{value}'")]
    InvalidNumber {
        /// Path of the file
        path: String,
        /// 1-based data row number
        row: usize,
        /// Column name
        column: String,
        /// Raw field value
        value: String,
    },

    /// A timestamp field matches none of the accepted formats.
    #[error("Row {row} of '{path}': invalid timestamp '{value}'")]
    InvalidTimestamp {
        /// Path of the file
        path: String,
        /// 1-based data row number
        row: usize,
        /// Raw field value
        value: String,
    },

    /// Distance pair is not in canonical `id1 < id2` order.
    #[error("Distance pair ({id1}, {id2}) violates id1 < id2 ordering")]
    PairOrder {
        /// First id as given
        id1: EntityId,
        /// Second id as given
        id2: EntityId,
    },

    /// Distance pair appears more than once.
    #[error("Distance pair ({id1}, {id2}) is listed more than once")]
    DuplicatePair {
        /// First id
        id1: EntityId,
        /// Second id
        id2: EntityId,
    },

    /// Distance value is negative or not finite.
    #[error("Distance for pair ({id1}, {id2}) must be finite and >= 0, got {value}")]
    InvalidDistance {
        /// First id
        id1: EntityId,
        /// Second id
        id2: EntityId,
        /// Offending value
        value: f64,
    },

    /// Behavioral vector length differs from the declared attribute count.
    #[error("Behavioral vector has {actual} values, expected {expected}")]
    DimensionMismatch {
        /// Declared dimensionality
        expected: usize,
        /// Length of the vector received
        actual: usize,
    },

    /// Temporal-mode filter names an entity with no observations.
    #[error("Entity '{entity}' has no observations in the dataset")]
    UnknownEntity {
        /// Entity requested by the filter
        entity: EntityId,
    },

    /// Dataset (after filtering) contains no observations.
    #[error("Dataset contains no observations")]
    EmptyDataset,

    /// An output file could not be written.
    #[error("Failed to write '{path}': {message}")]
    Write {
        /// Output path
        path: String,
        /// Underlying I/O message
        message: String,
    },
}

impl InputError {
    /// Build an [`InputError::Io`] from a path and any displayable cause.
    pub fn io(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Build an [`InputError::Csv`] from a path and a parser error.
    pub fn csv(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Csv {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Build an [`InputError::Write`] from a path and any displayable cause.
    pub fn write(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Write {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// CLUSTER ERROR
// ============================================================================

/// Errors raised by the neighborhood index and the two engines.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Parameter outside its valid range.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Human-readable description naming the parameter
        message: String,
    },

    /// Fewer than k reachable observations exist around `index`.
    ///
    /// The parameter set is incompatible with the data size; the run must be
    /// reported, not silently degraded.
    #[error(
        "k-distance undefined for observation {index}: k={k} but only {available} reachable neighbors"
    )]
    UndefinedKDistance {
        /// Observation index
        index: usize,
        /// Requested rank
        k: usize,
        /// Number of reachable candidates
        available: usize,
    },

    /// Not enough observations for the requested parameters.
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum observation count
        required: usize,
        /// Observation count provided
        actual: usize,
    },

    /// Two inputs that must line up do not.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },
}

impl ClusterError {
    /// Create an [`ClusterError::InvalidParameter`].
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create an [`ClusterError::UndefinedKDistance`].
    pub fn undefined_k_distance(index: usize, k: usize, available: usize) -> Self {
        Self::UndefinedKDistance {
            index,
            k,
            available,
        }
    }

    /// Create an [`ClusterError::InsufficientData`].
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Create an [`ClusterError::DimensionMismatch`].
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }
}

// ============================================================================
// CONFIG ERROR
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file '{path}': {message}")]
    Read {
        /// Config path
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// TOML could not be parsed into the config schema.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    /// A value failed validation.
    #[error("[{section}] {message}")]
    Invalid {
        /// Config section (`stbof`, `stbdbcan`, `weights`, `input`)
        section: &'static str,
        /// Description of the violation
        message: String,
    },
}

// ============================================================================
// MISSING DISTANCE
// ============================================================================

/// The distance table has no entry for a pair of distinct entities.
///
/// Recoverable: callers treat the pair as mutually unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No spatial distance between entities {id1} and {id2}")]
pub struct MissingDistance {
    /// Smaller id of the canonical pair
    pub id1: EntityId,
    /// Larger id of the canonical pair
    pub id2: EntityId,
}
