//! Outlier scoring and density-based clustering over contextual neighborhoods.
//!
//! - [`NeighborhoodIndex`]: k-distance and neighbor sets under the contextual metric
//! - [`StBof`]: behavioral outlier factor per observation
//! - [`StBdbcan`]: density clustering with behavioral core points
//! - [`validate_noise_ratio`]: advisory acceptance check on the labeling

pub mod density;
pub mod neighborhood;
pub mod stbdbcan;
pub mod stbof;
pub mod validation;

pub use density::{density_connected, density_ratio, local_reachability_densities};
pub use neighborhood::{Neighbor, NeighborhoodIndex};
pub use stbdbcan::{ClusteringResult, StBdbcan, StBdbcanParams, NOISE};
pub use stbof::{StBof, StBofParams, StBofResult, DEFAULT_UPPER_BOUND_FRACTION};
pub use validation::{validate_noise_ratio, NoiseValidation};
