//! `run` command: score and cluster a dataset.
//!
//! # Flow
//!
//! 1. Effective config = file (or defaults) → `STBDBCAN_*` env → flags
//! 2. Load the distance table, then the dataset
//! 3. Run the pipeline
//! 4. Write `<stem>_results.{csv,txt,json}`, print the report to stdout
//!
//! Any failure before step 4 leaves no output behind.

use std::path::PathBuf;

use clap::Args;
use tracing::{debug, error, info, warn};

use stbdbcan_core::io::{load_dataset, load_distances, write_results, ResultPaths};
use stbdbcan_core::{Pipeline, RunConfig, RunOutcome, StError};

use super::ConfigSource;
use crate::error::CliExitCode;

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Dataset CSV (id, timestamp, behavioral columns)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Pairwise spatial distances CSV (id1, id2, dist)
    #[arg(short, long)]
    pub distances: PathBuf,

    /// Behavioral attribute names
    #[arg(short, long, num_args = 1..)]
    pub behavioral: Vec<String>,

    #[command(flatten)]
    pub source: ConfigSource,

    /// Neighbors considered by ST-BOF
    #[arg(long = "min-pts")]
    pub min_pts: Option<usize>,

    /// Rank of the neighbor defining the ST-BOF k-distance
    #[arg(short)]
    pub k: Option<usize>,

    /// Accepted relative variation between densities, in [0, 1]
    #[arg(long)]
    pub pct: Option<f64>,

    /// Neighbors considered by ST-BDBCAN
    #[arg(long = "stbdbcan-min-pts")]
    pub stbdbcan_min_pts: Option<usize>,

    /// Minimum cluster cardinality
    #[arg(long = "min-pts-cluster")]
    pub min_pts_cluster: Option<usize>,

    /// Maximum accepted share of noise points, in [0, 1]
    #[arg(long = "min-noise-percentage")]
    pub min_noise_percentage: Option<f64>,

    /// Behavioral attribute weights, one per attribute
    #[arg(long = "bw", num_args = 1..)]
    pub behavioral_weights: Option<Vec<f64>>,

    /// Spatial weight
    #[arg(long = "sw")]
    pub spatial_weight: Option<f64>,

    /// Temporal weight (per minute)
    #[arg(long = "tw")]
    pub temporal_weight: Option<f64>,

    /// Restrict the run to one entity's time series
    #[arg(short, long)]
    pub temporal: Option<String>,

    /// Use behavioral values as-is instead of min-max scaling them
    #[arg(long)]
    pub no_normalize: bool,

    /// Add a per-observation `stbof` column to the results CSV
    #[arg(long)]
    pub emit_scores: bool,

    /// Directory for result files (defaults to the dataset's directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Overlay command-line values onto `config`.
    pub fn apply(&self, mut config: RunConfig) -> RunConfig {
        if !self.behavioral.is_empty() {
            config.input.behavioral = self.behavioral.clone();
        }
        if let Some(v) = self.min_pts {
            config.stbof.min_pts = v;
        }
        if let Some(v) = self.k {
            config.stbof.k = v;
        }
        if let Some(v) = self.pct {
            config.stbdbcan.pct = v;
        }
        if let Some(v) = self.stbdbcan_min_pts {
            config.stbdbcan.min_pts = v;
        }
        if let Some(v) = self.min_pts_cluster {
            config.stbdbcan.min_pts_cluster = v;
        }
        if let Some(v) = self.min_noise_percentage {
            config.stbdbcan.min_noise_percentage = v;
        }
        if let Some(bw) = &self.behavioral_weights {
            config.weights.behavioral = Some(bw.clone());
        }
        if let Some(v) = self.spatial_weight {
            config.weights.spatial = v;
        }
        if let Some(v) = self.temporal_weight {
            config.weights.temporal = v;
        }
        if let Some(entity) = &self.temporal {
            config.input.temporal_entity = Some(entity.clone());
        }
        if self.no_normalize {
            config.input.normalize = false;
        }
        if self.emit_scores {
            config.output.emit_scores = true;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = Some(dir.display().to_string());
        }
        config
    }
}

/// Execute the run command and return the process exit code.
pub fn run_command(args: RunArgs) -> i32 {
    debug!("run_command: args={:?}", args);

    match execute(&args) {
        Ok((outcome, paths)) => {
            print!("{}", outcome.summary().render_report());
            println!("Results written to {}", paths.csv.display());
            if !outcome.summary().validation.accepted {
                warn!(
                    noise_ratio = outcome.summary().validation.noise_ratio,
                    "Run completed but the noise ratio was rejected"
                );
            }
            CliExitCode::Success.into()
        }
        Err(e) => {
            error!(category = e.category(), "{}", e);
            eprintln!("Error: {}", e);
            CliExitCode::from(&e).into()
        }
    }
}

fn execute(args: &RunArgs) -> Result<(RunOutcome, ResultPaths), StError> {
    let config = args.apply(args.source.load()?);
    let pipeline = Pipeline::new(config)?;
    let config = pipeline.config();

    let table = load_distances(&args.distances)?;
    let loaded = load_dataset(&args.file, &config.input)?;
    let outcome = pipeline.run(&loaded.dataset, &table)?;

    let directory = config.output.directory.as_ref().map(PathBuf::from);
    let paths = ResultPaths::for_dataset(&args.file, directory.as_deref());
    write_results(&paths, &loaded.raw, &outcome, config.output.emit_scores)?;

    info!(csv = %paths.csv.display(), "Run finished");
    Ok((outcome, paths))
}
