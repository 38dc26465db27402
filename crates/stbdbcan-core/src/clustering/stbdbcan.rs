//! Spatio-Temporal Behavioral Density-Based Clustering of Applications with
//! Noise (ST-BDBCAN).
//!
//! DBSCAN-style expansion where neighborhoods are contextual and the core-point
//! predicate is behavioral: a point is core when enough of its contextual
//! neighbors have a local behavioral density within `pct` of its own.
//!
//! # Algorithm
//!
//! 1. Build the contextual neighborhood index with `min_pts`
//! 2. Compute `lrd` for every point over that index (reach capped at rank `min_pts`)
//! 3. For each point, list the density-connected neighbors; core = list length >= `min_pts`
//! 4. Expand clusters breadth-first in index order
//! 5. Prune clusters smaller than `min_pts_cluster`, renumber the rest densely
//!
//! Densities are never taken from ST-BOF. Its reachability is capped at its
//! own `k`; here the cap is `min_pts` of this engine, so the two density
//! vectors differ whenever `k != min_pts` or the two `min_pts` differ.
//!
//! Labels live in an arena indexed by observation because a label can change
//! more than once (NOISE → border member, cluster → NOISE on pruning).

use std::collections::VecDeque;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::distance::DistanceModel;
use crate::error::ClusterError;
use crate::types::Dataset;

use super::density::{density_connected, local_reachability_densities};
use super::neighborhood::NeighborhoodIndex;

/// Label of observations that belong to no cluster.
pub const NOISE: i32 = -1;

/// Parameters for ST-BDBCAN.
///
/// # Example
///
/// ```
/// use stbdbcan_core::clustering::StBdbcanParams;
///
/// let params = StBdbcanParams::default()
///     .with_min_pts(3)
///     .with_pct(0.5)
///     .with_min_pts_cluster(3);
/// assert!(params.validate().is_ok());
/// assert!(params.with_pct(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StBdbcanParams {
    /// Neighbors considered per point; also the core-point threshold.
    pub min_pts: usize,

    /// Tolerated relative variation between two densities, in [0, 1].
    pub pct: f64,

    /// Clusters smaller than this are dissolved into noise.
    pub min_pts_cluster: usize,

    /// Acceptance threshold on the noise ratio, in [0, 1].
    /// 1.0 accepts every run.
    pub min_noise_percentage: f64,
}

impl Default for StBdbcanParams {
    fn default() -> Self {
        Self {
            min_pts: 10,
            pct: 0.5,
            min_pts_cluster: 5,
            min_noise_percentage: 1.0,
        }
    }
}

impl StBdbcanParams {
    /// Set min_pts.
    #[must_use]
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// Set pct.
    #[must_use]
    pub fn with_pct(mut self, pct: f64) -> Self {
        self.pct = pct;
        self
    }

    /// Set min_pts_cluster.
    #[must_use]
    pub fn with_min_pts_cluster(mut self, size: usize) -> Self {
        self.min_pts_cluster = size;
        self
    }

    /// Set min_noise_percentage.
    #[must_use]
    pub fn with_min_noise_percentage(mut self, ratio: f64) -> Self {
        self.min_noise_percentage = ratio;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::InvalidParameter` if:
    /// - min_pts < 1
    /// - pct outside [0, 1]
    /// - min_pts_cluster < 1
    /// - min_noise_percentage outside [0, 1]
    pub fn validate(&self) -> Result<(), ClusterError> {
        if self.min_pts < 1 {
            return Err(ClusterError::invalid_parameter(format!(
                "min_pts must be >= 1, got {}",
                self.min_pts
            )));
        }
        if !(0.0..=1.0).contains(&self.pct) {
            return Err(ClusterError::invalid_parameter(format!(
                "pct must be in [0, 1], got {}",
                self.pct
            )));
        }
        if self.min_pts_cluster < 1 {
            return Err(ClusterError::invalid_parameter(format!(
                "min_pts_cluster must be >= 1, got {}",
                self.min_pts_cluster
            )));
        }
        if !(0.0..=1.0).contains(&self.min_noise_percentage) {
            return Err(ClusterError::invalid_parameter(format!(
                "min_noise_percentage must be in [0, 1], got {}",
                self.min_noise_percentage
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

/// Per-observation state during expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointState {
    Unvisited,
    Noise,
    Cluster(usize),
}

/// ST-BDBCAN clusterer.
///
/// # Example
///
/// ```
/// use stbdbcan_core::clustering::{NeighborhoodIndex, StBdbcan, StBdbcanParams, NOISE};
///
/// // Six co-located points; the last one has a very different density
/// let index = NeighborhoodIndex::build_with(6, 3, |_, _| 0.0).unwrap();
/// let densities = [2.0, 2.1, 1.9, 2.0, 2.05, 40.0];
///
/// let params = StBdbcanParams::default().with_min_pts(3).with_pct(0.2).with_min_pts_cluster(3);
/// let result = StBdbcan::new(params).cluster_with(&index, &densities).unwrap();
///
/// assert_eq!(result.n_clusters(), 1);
/// assert_eq!(&result.labels()[..5], &[0, 0, 0, 0, 0]);
/// assert_eq!(result.labels()[5], NOISE);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StBdbcan {
    params: StBdbcanParams,
}

impl StBdbcan {
    /// Create a clusterer with the given parameters.
    pub fn new(params: StBdbcanParams) -> Self {
        Self { params }
    }

    /// Parameters in use.
    pub fn params(&self) -> &StBdbcanParams {
        &self.params
    }

    /// Cluster every observation of `dataset`.
    ///
    /// Builds its own neighborhood index and densities; nothing is shared with
    /// ST-BOF.
    ///
    /// # Errors
    ///
    /// - `ClusterError::InvalidParameter` if the parameters do not validate
    /// - `ClusterError::InsufficientData` if `dataset.len() <= min_pts`
    /// - `ClusterError::UndefinedKDistance` if an observation has too few reachable neighbors
    pub fn fit(
        &self,
        dataset: &Dataset,
        model: &DistanceModel,
    ) -> Result<ClusteringResult, ClusterError> {
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
            pct = self.params.pct,
            min_pts_cluster = self.params.min_pts_cluster,
            "Computing ST-BDBCAN"
        );

        let index = NeighborhoodIndex::build(dataset, model, self.params.min_pts)?;
        let densities =
            local_reachability_densities(dataset, model, &index, self.params.min_pts)?;
        let result = self.cluster_with(&index, &densities)?;

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            clusters = result.n_clusters(),
            noise = result.noise_count(),
            pruned = result.pruned_clusters(),
            "ST-BDBCAN done"
        );
        Ok(result)
    }

    /// Run the core-point predicate, expansion and pruning over a prepared
    /// index and density vector.
    ///
    /// # Errors
    ///
    /// - `ClusterError::InvalidParameter` if the parameters do not validate
    /// - `ClusterError::DimensionMismatch` if `densities.len() != index.len()`
    pub fn cluster_with(
        &self,
        index: &NeighborhoodIndex,
        densities: &[f64],
    ) -> Result<ClusteringResult, ClusterError> {
        self.params.validate()?;
        let n = index.len();
        if densities.len() != n {
            return Err(ClusterError::dimension_mismatch(n, densities.len()));
        }

        let pct = self.params.pct;
        let connected: Vec<Vec<usize>> = (0..n)
            .into_par_iter()
            .map(|p| {
                index
                    .neighbors(p)
                    .iter()
                    .filter(|nb| density_connected(densities[p], densities[nb.index], pct))
                    .map(|nb| nb.index)
                    .collect()
            })
            .collect();
        let is_core: Vec<bool> = connected
            .iter()
            .map(|c| c.len() >= self.params.min_pts)
            .collect();

        debug!(
            core_points = is_core.iter().filter(|&&c| c).count(),
            points = n,
            "Core-point predicate evaluated"
        );

        let (states, n_raw) = expand(&connected, &is_core);
        let (labels, cluster_sizes, pruned) =
            prune_and_relabel(&states, n_raw, self.params.min_pts_cluster);

        if pruned > 0 {
            debug!(
                pruned_clusters = pruned,
                min_pts_cluster = self.params.min_pts_cluster,
                "Undersized clusters dissolved into noise"
            );
        }

        Ok(ClusteringResult {
            labels,
            is_core,
            cluster_sizes,
            pruned_clusters: pruned,
        })
    }
}

/// Breadth-first expansion in index order. Returns raw states and the number
/// of clusters opened.
fn expand(connected: &[Vec<usize>], is_core: &[bool]) -> (Vec<PointState>, usize) {
    let n = connected.len();
    let mut states = vec![PointState::Unvisited; n];
    let mut next_cluster = 0usize;
    let mut queue = VecDeque::new();

    for p in 0..n {
        if states[p] != PointState::Unvisited {
            continue;
        }
        if !is_core[p] {
            // May still become a border point of a later cluster
            states[p] = PointState::Noise;
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        states[p] = PointState::Cluster(cluster);
        queue.extend(connected[p].iter().copied());

        while let Some(q) = queue.pop_front() {
            match states[q] {
                PointState::Unvisited => {
                    states[q] = PointState::Cluster(cluster);
                    if is_core[q] {
                        queue.extend(connected[q].iter().copied());
                    }
                }
                // Noise is never core: it joins as a border point only
                PointState::Noise => states[q] = PointState::Cluster(cluster),
                PointState::Cluster(_) => {}
            }
        }
    }

    (states, next_cluster)
}

/// Dissolve clusters below `min_size` and renumber the survivors in discovery
/// order. Returns (labels, surviving cluster sizes, pruned count).
fn prune_and_relabel(
    states: &[PointState],
    n_raw: usize,
    min_size: usize,
) -> (Vec<i32>, Vec<usize>, usize) {
    let mut raw_sizes = vec![0usize; n_raw];
    for state in states {
        if let PointState::Cluster(c) = state {
            raw_sizes[*c] += 1;
        }
    }

    let mut remap: Vec<Option<i32>> = vec![None; n_raw];
    let mut sizes = Vec::new();
    for (c, &size) in raw_sizes.iter().enumerate() {
        if size >= min_size {
            remap[c] = Some(sizes.len() as i32);
            sizes.push(size);
        }
    }

    let labels = states
        .iter()
        .map(|state| match state {
            PointState::Cluster(c) => remap[*c].unwrap_or(NOISE),
            _ => NOISE,
        })
        .collect();

    let pruned = n_raw - sizes.len();
    (labels, sizes, pruned)
}

/// Final labels and per-cluster statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringResult {
    labels: Vec<i32>,
    is_core: Vec<bool>,
    cluster_sizes: Vec<usize>,
    pruned_clusters: usize,
}

impl ClusteringResult {
    /// Label per observation: [`NOISE`] or a cluster id in `0..n_clusters()`.
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Core-point flag per observation.
    pub fn core_points(&self) -> &[bool] {
        &self.is_core
    }

    /// Number of clusters surviving pruning.
    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.cluster_sizes.len()
    }

    /// Cardinality of each surviving cluster, indexed by cluster id.
    pub fn cluster_sizes(&self) -> &[usize] {
        &self.cluster_sizes
    }

    /// Clusters dissolved for being smaller than `min_pts_cluster`.
    #[inline]
    pub fn pruned_clusters(&self) -> usize {
        self.pruned_clusters
    }

    /// Number of observations labeled [`NOISE`].
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == NOISE).count()
    }
}
