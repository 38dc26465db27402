//! End-to-end run: mode filter, scaling, distance model, ST-BOF, ST-BDBCAN,
//! noise validation.

use std::time::Instant;

use tracing::info;

use crate::clustering::{validate_noise_ratio, StBdbcan, StBof};
use crate::config::RunConfig;
use crate::distance::{DistanceModel, SpatialDistanceTable};
use crate::error::{InputError, Result};
use crate::summary::{ClusteringSummary, RunSummary, StBofSummary};
use crate::types::{Dataset, RunMode};

/// Result of one observation, addressed by its source row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowResult {
    /// 0-based data row in the input file.
    pub row: usize,
    /// Cluster id or -1.
    pub label: i32,
    /// ST-BOF score.
    pub score: f64,
}

/// Labels, scores and summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    results: Vec<RowResult>,
    summary: RunSummary,
}

impl RunOutcome {
    /// Per-observation results in run order (timestamp order in temporal mode).
    pub fn results(&self) -> &[RowResult] {
        &self.results
    }

    /// Per-observation results sorted by source row.
    pub fn by_row(&self) -> Vec<RowResult> {
        let mut rows = self.results.clone();
        rows.sort_by_key(|r| r.row);
        rows
    }

    /// Labels in run order.
    pub fn labels(&self) -> Vec<i32> {
        self.results.iter().map(|r| r.label).collect()
    }

    /// Scores in run order.
    pub fn scores(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.score).collect()
    }

    /// Run summary.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }
}

/// Runs both engines over a dataset with one validated configuration.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use stbdbcan_core::config::RunConfig;
/// use stbdbcan_core::distance::SpatialDistanceTable;
/// use stbdbcan_core::types::{Dataset, EntityId};
/// use stbdbcan_core::Pipeline;
///
/// let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let mut data = Dataset::new(vec!["flow".into()]);
/// for _ in 0..10 {
///     data.push(EntityId::from(1), t, vec![5.0]).unwrap();
/// }
///
/// let mut config = RunConfig::default();
/// config.input.behavioral = vec!["flow".into()];
/// config.stbof.min_pts = 3;
/// config.stbof.k = 3;
/// config.stbdbcan.min_pts = 3;
/// config.stbdbcan.min_pts_cluster = 3;
///
/// let outcome = Pipeline::new(config).unwrap()
///     .run(&data, &SpatialDistanceTable::new())
///     .unwrap();
/// assert_eq!(outcome.summary().clustering.n_clusters, 1);
/// assert!(outcome.labels().iter().all(|&l| l == 0));
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: RunConfig,
}

impl Pipeline {
    /// Validate `config` and build the pipeline.
    ///
    /// # Errors
    /// - `ConfigError::Invalid` if any section fails validation
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Score and cluster `dataset`.
    ///
    /// `dataset` carries raw values; scaling is applied here when enabled.
    ///
    /// # Errors
    /// - `InputError::UnknownEntity` if the temporal entity has no observations
    /// - `InputError::EmptyDataset` if nothing is left to process
    /// - Any `ClusterError` raised by the distance model or the engines
    pub fn run(&self, dataset: &Dataset, table: &SpatialDistanceTable) -> Result<RunOutcome> {
        let start = Instant::now();
        let mode = self.config.input.mode();

        let working = match &mode {
            RunMode::Temporal { entity } => dataset.filter_entity(entity)?,
            RunMode::SpatioTemporal => dataset.clone(),
        };
        if working.is_empty() {
            return Err(InputError::EmptyDataset.into());
        }
        let working = if self.config.input.normalize {
            working.normalized()
        } else {
            working
        };

        info!(
            mode = %mode,
            points = working.len(),
            entities = working.entities().len(),
            "Starting run"
        );

        let weights = self.config.weights.bind(working.dimension());
        let model = DistanceModel::new(&working, table, weights, &mode)?;

        let stbof_start = Instant::now();
        let stbof = StBof::new(self.config.stbof.clone()).fit(&working, &model)?;
        let stbof_ms = stbof_start.elapsed().as_millis() as u64;

        let cluster_start = Instant::now();
        let clustering = StBdbcan::new(self.config.stbdbcan.clone()).fit(&working, &model)?;
        let cluster_ms = cluster_start.elapsed().as_millis() as u64;

        let validation = validate_noise_ratio(
            clustering.labels(),
            self.config.stbdbcan.min_noise_percentage,
        );

        let fraction = self.config.stbof.upper_bound_fraction;
        let percentile_upper_bound = stbof.percentile_upper_bound(fraction);
        let summary = RunSummary {
            mode: mode.to_string(),
            points: working.len(),
            attributes: working.attributes().to_vec(),
            normalized: self.config.input.normalize,
            weights: model.weights().clone(),
            stbof: StBofSummary {
                params: self.config.stbof.clone(),
                max: stbof.upper_bound(),
                percentile_upper_bound,
                percentile_rank: stbof.percentile_rank(fraction),
                outliers: stbof.outliers_above(percentile_upper_bound).len(),
                elapsed_ms: stbof_ms,
            },
            clustering: ClusteringSummary {
                params: self.config.stbdbcan.clone(),
                n_clusters: clustering.n_clusters(),
                cluster_sizes: clustering.cluster_sizes().to_vec(),
                pruned_clusters: clustering.pruned_clusters(),
                core_points: clustering.core_points().iter().filter(|&&c| c).count(),
                elapsed_ms: cluster_ms,
            },
            validation,
        };

        let results = working
            .observations()
            .iter()
            .zip(clustering.labels())
            .zip(stbof.scores())
            .map(|((obs, &label), &score)| RowResult {
                row: obs.row(),
                label,
                score,
            })
            .collect();

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            clusters = summary.clustering.n_clusters,
            noise = summary.validation.noise_count,
            accepted = summary.validation.accepted,
            "Run complete"
        );

        Ok(RunOutcome { results, summary })
    }
}
