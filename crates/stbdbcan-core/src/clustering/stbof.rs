//! Spatio-Temporal Behavioral Outlier Factor (ST-BOF).
//!
//! Measures how much an observation's behavioral density deviates from that
//! of its spatio-temporal neighbors. Contextual attributes define the
//! neighborhood; only behavioral attributes enter the density.
//!
//! # Algorithm
//!
//! 1. Build the contextual neighborhood index with `min_pts`
//! 2. Compute `lrd(p)` with reachability capped at rank `k` (see [`super::density`])
//! 3. `ST-BOF(p) = mean_{q ∈ N(p)} lrd(q) / lrd(p)`
//!
//! `ST-BOF ≈ 1`: p is as dense as its context. `< 1`: denser (typical).
//! `> 1`: sparser (behaviorally anomalous for its place and time).

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::distance::DistanceModel;
use crate::error::ClusterError;
use crate::types::Dataset;

use super::density::{density_ratio, local_reachability_densities};
use super::neighborhood::NeighborhoodIndex;

/// Default fraction of top scores used for the percentile upper bound.
pub const DEFAULT_UPPER_BOUND_FRACTION: f64 = 0.01;

/// Parameters for ST-BOF.
///
/// # Example
///
/// ```
/// use stbdbcan_core::clustering::StBofParams;
///
/// let params = StBofParams::default().with_min_pts(20).with_k(7);
/// assert!(params.validate().is_ok());
///
/// let invalid = StBofParams::default().with_min_pts(3).with_k(5);
/// assert!(invalid.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StBofParams {
    /// Number of contextual neighbors considered for the density.
    /// Usually 10 to 45.
    pub min_pts: usize,

    /// Rank of the neighbor defining the reachability cap.
    /// Must be <= min_pts. Usually 3 to 9.
    pub k: usize,

    /// Fraction of highest scores that defines the percentile upper bound.
    pub upper_bound_fraction: f64,
}

impl Default for StBofParams {
    fn default() -> Self {
        Self {
            min_pts: 10,
            k: 5,
            upper_bound_fraction: DEFAULT_UPPER_BOUND_FRACTION,
        }
    }
}

impl StBofParams {
    /// Set min_pts.
    #[must_use]
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// Set k.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if:
    /// - min_pts < 1
    /// - k < 1 or k > min_pts
    /// - upper_bound_fraction outside (0, 1]
    pub fn validate(&self) -> Result<(), ClusterError> {
        if self.min_pts < 1 {
            return Err(ClusterError::invalid_parameter(format!(
                "min_pts must be >= 1, got {}",
                self.min_pts
            )));
        }
        if self.k < 1 || self.k > self.min_pts {
            return Err(ClusterError::invalid_parameter(format!(
                "k must be in [1, min_pts={}], got {}",
                self.min_pts, self.k
            )));
        }
        if !(self.upper_bound_fraction > 0.0 && self.upper_bound_fraction <= 1.0) {
            return Err(ClusterError::invalid_parameter(format!(
                "upper_bound_fraction must be in (0, 1], got {}",
                self.upper_bound_fraction
            )));
        }
        Ok(())
    }

    /// True when `n_points` observations leave `min_pts` others for each one.
    #[inline]
    pub fn is_viable_for_size(&self, n_points: usize) -> bool {
        n_points > self.min_pts
    }
}

/// ST-BOF scorer.
#[derive(Debug, Clone, Default)]
pub struct StBof {
    params: StBofParams,
}

impl StBof {
    /// Create a scorer with the given parameters.
    pub fn new(params: StBofParams) -> Self {
        Self { params }
    }

    /// Parameters in use.
    pub fn params(&self) -> &StBofParams {
        &self.params
    }

    /// Score every observation of `dataset`.
    ///
    /// # Errors
    ///
    /// - `ClusterError::InvalidParameter` if the parameters do not validate
    /// - `ClusterError::InsufficientData` if `dataset.len() <= min_pts`
    /// - `ClusterError::UndefinedKDistance` if an observation has too few reachable neighbors
    pub fn fit(&self, dataset: &Dataset, model: &DistanceModel) -> Result<StBofResult, ClusterError> {
        self.params.validate()?;
        if !self.params.is_viable_for_size(dataset.len()) {
            return Err(ClusterError::insufficient_data(
                self.params.min_pts + 1,
                dataset.len(),
            ));
        }

        let start = Instant::now();
        info!(
            points = dataset.len(),
            min_pts = self.params.min_pts,
            k = self.params.k,
            "Computing ST-Behavioral Outlier Factor"
        );

        let index = NeighborhoodIndex::build(dataset, model, self.params.min_pts)?;
        let densities = local_reachability_densities(dataset, model, &index, self.params.k)?;

        let scores: Vec<f64> = (0..dataset.len())
            .into_par_iter()
            .map(|p| {
                let neighbors = index.neighbors(p);
                let total: f64 = neighbors
                    .iter()
                    .map(|nb| density_ratio(densities[nb.index], densities[p]))
                    .sum();
                total / neighbors.len() as f64
            })
            .collect();

        let result = StBofResult { scores, densities };
        debug!(
            infinite_densities = result.densities.iter().filter(|d| d.is_infinite()).count(),
            "ST-BOF densities computed"
        );
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            max_score = result.upper_bound(),
            "ST-BOF done"
        );

        Ok(result)
    }
}

/// Per-observation ST-BOF scores and the densities they derive from.
#[derive(Debug, Clone, PartialEq)]
pub struct StBofResult {
    scores: Vec<f64>,
    densities: Vec<f64>,
}

impl StBofResult {
    /// ST-BOF per observation, in index order.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// ST-BOF of observation `p`.
    #[inline]
    pub fn score(&self, p: usize) -> f64 {
        self.scores[p]
    }

    /// Local behavioral reachability density per observation.
    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    /// Run-wide maximum score (ST-BOFUB). 0 for an empty result.
    pub fn upper_bound(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Score of the observation ranked at the top `fraction` of scores.
    ///
    /// With 1000 observations and `fraction = 0.01` this is the 10th highest
    /// score. The rank is clamped to `[1, n]`.
    pub fn percentile_upper_bound(&self, fraction: f64) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let mut sorted = self.scores.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        sorted[self.percentile_rank(fraction) - 1]
    }

    /// 1-based rank used by [`StBofResult::percentile_upper_bound`].
    /// 0 for an empty result.
    pub fn percentile_rank(&self, fraction: f64) -> usize {
        let n = self.scores.len();
        if n == 0 {
            return 0;
        }
        ((n as f64 * fraction).round() as usize).clamp(1, n)
    }

    /// Indices of observations whose score exceeds `threshold`.
    pub fn outliers_above(&self, threshold: f64) -> Vec<usize> {
        self.scores
            .iter()
            .enumerate()
            .filter(|(_, &s)| s > threshold)
            .map(|(i, _)| i)
            .collect()
    }
}
