//! ST-BDBCAN Core Library
//!
//! Spatio-temporal behavioral outlier scoring (ST-BOF) and density-based
//! clustering (ST-BDBCAN) over observations that carry a contextual part
//! (entity, timestamp) and a behavioral vector.
//!
//! # Architecture
//!
//! This crate defines:
//! - Domain types (`EntityId`, `Dataset`, `RunMode`)
//! - The distance model (contextual and behavioral metrics)
//! - The neighborhood index and both engines
//! - Noise-ratio validation, the end-to-end [`Pipeline`] and its [`RunSummary`]
//! - Configuration, error types and CSV I/O
//!
//! # Example
//!
//! ```
//! use stbdbcan_core::clustering::{NeighborhoodIndex, StBdbcan, StBdbcanParams};
//!
//! let index = NeighborhoodIndex::build_with(4, 2, |p, q| (p as f64 - q as f64).abs()).unwrap();
//! let params = StBdbcanParams::default()
//!     .with_min_pts(2)
//!     .with_min_pts_cluster(2);
//! let result = StBdbcan::new(params).cluster_with(&index, &[1.0; 4]).unwrap();
//! assert_eq!(result.n_clusters(), 1);
//! ```

pub mod clustering;
pub mod config;
pub mod distance;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod summary;
pub mod types;

// Re-exports for convenience
pub use config::RunConfig;
pub use error::{Result, StError};
pub use pipeline::{Pipeline, RowResult, RunOutcome};
pub use summary::RunSummary;
