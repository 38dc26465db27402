//! Error types for stbdbcan-core.
//!
//! - [`StError`]: Top-level unified error for every fallible operation in the crate
//! - Sub-error types: [`InputError`], [`ClusterError`], [`ConfigError`]
//! - [`MissingDistance`]: recoverable lookup failure, mapped to infinite distance
//!
//! Input and configuration errors are raised before any computation starts.
//! Cluster errors signal a parameter set that cannot be honored for the data
//! at hand (e.g. an undefined k-distance). All of them abort the run; none of
//! them leave partial output behind.
//!
//! # Examples
//!
//! ```rust
//! use stbdbcan_core::error::{ClusterError, StError};
//!
//! let err: StError = ClusterError::undefined_k_distance(4, 10, 3).into();
//! assert!(err.to_string().contains("k-distance"));
//! assert!(!err.is_input_error());
//! ```

mod sub_errors;
mod unified;


pub use sub_errors::{ClusterError, ConfigError, InputError, MissingDistance};
pub use unified::{Result, StError};
