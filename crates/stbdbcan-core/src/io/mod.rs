//! CSV input and result output.
//!
//! - [`load_dataset`]: observations plus the raw rows for write-back
//! - [`load_distances`]: the `id1,id2,dist` spatial distance table
//! - [`write_results`]: results CSV, text report and JSON summary

mod dataset;
mod distances;
mod results;

pub use dataset::{load_dataset, parse_timestamp, read_dataset, LoadedDataset, RawTable};
pub use distances::{load_distances, read_distances};
pub use results::{
    render_results_csv, write_results, ResultPaths, CLUSTER_COLUMN, SCORE_COLUMN,
};
