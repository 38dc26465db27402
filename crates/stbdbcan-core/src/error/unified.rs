//! Top-level unified error type for stbdbcan-core.

use thiserror::Error;

use super::sub_errors::{ClusterError, ConfigError, InputError};

/// Top-level unified error type.
///
/// Every sub-error converts into this type via `From`, so `?` works across
/// module boundaries.
#[derive(Debug, Error)]
pub enum StError {
    /// Malformed or inconsistent input data.
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Parameters incompatible with the data, or invalid for the algorithm.
    #[error("Clustering error: {0}")]
    Cluster(#[from] ClusterError),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StError {
    /// True when the failure originates from the input files or their contents.
    pub fn is_input_error(&self) -> bool {
        matches!(self, StError::Input(_))
    }

    /// Process exit code for this failure: 1 for input or I/O problems,
    /// 2 for configuration and parameter problems.
    pub fn exit_code(&self) -> i32 {
        match self {
            StError::Input(_) => 1,
            StError::Cluster(_) | StError::Config(_) => 2,
        }
    }

    /// Short stable category name, used in logs.
    pub fn category(&self) -> &'static str {
        match self {
            StError::Input(_) => "input",
            StError::Cluster(_) => "clustering",
            StError::Config(_) => "config",
        }
    }
}

/// Result type alias using [`StError`].
pub type Result<T> = std::result::Result<T, StError>;
