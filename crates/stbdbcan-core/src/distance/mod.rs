//! Distance model: spatial table, contextual metric, behavioral metric.

mod model;
mod spatial;

pub use model::{DistanceModel, Weights};
pub use spatial::SpatialDistanceTable;
