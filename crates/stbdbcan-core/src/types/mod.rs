//! Domain types: entities, observations, datasets and run modes.

mod entity;
mod mode;
mod observation;

pub use entity::EntityId;
pub use mode::RunMode;
pub use observation::{Dataset, Observation};
