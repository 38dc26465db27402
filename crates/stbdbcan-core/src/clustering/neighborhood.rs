//! Contextual neighborhood index.
//!
//! One abstraction parameterized by `(min_pts, metric)`, instantiated once for
//! ST-BOF and once for ST-BDBCAN so both algorithms share the same notion of
//! "neighbor".
//!
//! # Algorithm
//!
//! For every observation p:
//! 1. Compute the metric to every other observation q; drop unreachable (infinite) q
//! 2. Sort ascending by (distance, index) so ties resolve deterministically
//! 3. `k_distance(p)` = distance of the `min_pts`-th ranked q
//! 4. `neighbors(p)` = every q within `k_distance(p)`, ties included

use rayon::prelude::*;
use tracing::debug;

use crate::distance::DistanceModel;
use crate::error::ClusterError;
use crate::types::Dataset;

/// One ranked neighbor of an observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Observation index of the neighbor.
    pub index: usize,
    /// Metric value from the owning observation.
    pub distance: f64,
}

/// Per-observation k-distance and neighbor sets under one metric.
///
/// # Example
///
/// ```
/// use stbdbcan_core::clustering::NeighborhoodIndex;
///
/// // Five points on a line
/// let xs: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 10.0];
/// let index = NeighborhoodIndex::build_with(xs.len(), 2, |p, q| (xs[p] - xs[q]).abs()).unwrap();
///
/// assert_eq!(index.k_distance(0), 2.0);
/// let ids: Vec<usize> = index.neighbors(2).iter().map(|n| n.index).collect();
/// assert_eq!(ids, vec![1, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct NeighborhoodIndex {
    min_pts: usize,
    k_distances: Vec<f64>,
    neighborhoods: Vec<Vec<Neighbor>>,
}

impl NeighborhoodIndex {
    /// Build the index over `dataset` with the model's contextual metric.
    ///
    /// # Errors
    ///
    /// - `ClusterError::InvalidParameter` if `min_pts == 0`
    /// - `ClusterError::UndefinedKDistance` if some observation has fewer than
    ///   `min_pts` reachable others
    pub fn build(
        dataset: &Dataset,
        model: &DistanceModel,
        min_pts: usize,
    ) -> Result<Self, ClusterError> {
        let observations = dataset.observations();
        Self::build_with(dataset.len(), min_pts, |p, q| {
            model.contextual_distance(&observations[p], &observations[q])
        })
    }

    /// Build the index over `n` points with an arbitrary symmetric metric.
    ///
    /// `metric(p, q)` returning `f64::INFINITY` marks q as unreachable from p.
    pub fn build_with<F>(n: usize, min_pts: usize, metric: F) -> Result<Self, ClusterError>
    where
        F: Fn(usize, usize) -> f64 + Sync,
    {
        if min_pts == 0 {
            return Err(ClusterError::invalid_parameter(
                "min_pts must be >= 1 to define a k-distance",
            ));
        }

        let rows: Vec<Result<(f64, Vec<Neighbor>), ClusterError>> = (0..n)
            .into_par_iter()
            .map(|p| {
                let mut ranked: Vec<Neighbor> = (0..n)
                    .filter(|&q| q != p)
                    .map(|q| Neighbor {
                        index: q,
                        distance: metric(p, q),
                    })
                    .filter(|nb| nb.distance.is_finite())
                    .collect();

                ranked.sort_by(|a, b| {
                    a.distance
                        .total_cmp(&b.distance)
                        .then_with(|| a.index.cmp(&b.index))
                });

                let radius = k_distance_of(&ranked, min_pts)
                    .ok_or_else(|| ClusterError::undefined_k_distance(p, min_pts, ranked.len()))?;

                let within = ranked.partition_point(|nb| nb.distance <= radius);
                ranked.truncate(within);
                ranked.shrink_to_fit();
                Ok((radius, ranked))
            })
            .collect();

        // Sequential collect keeps the reported error deterministic
        let rows = rows.into_iter().collect::<Result<Vec<_>, _>>()?;
        let (k_distances, neighborhoods): (Vec<f64>, Vec<Vec<Neighbor>>) = rows.into_iter().unzip();

        let tied = neighborhoods
            .iter()
            .filter(|nbrs| nbrs.len() > min_pts)
            .count();
        debug!(
            points = n,
            min_pts,
            neighborhoods_with_ties = tied,
            "Neighborhood index built"
        );

        Ok(Self {
            min_pts,
            k_distances,
            neighborhoods,
        })
    }

    /// Rank used to derive each radius.
    #[inline]
    pub fn min_pts(&self) -> usize {
        self.min_pts
    }

    /// Number of indexed observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.neighborhoods.len()
    }

    /// True when the index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neighborhoods.is_empty()
    }

    /// Distance from `p` to its `min_pts`-th ranked neighbor.
    #[inline]
    pub fn k_distance(&self, p: usize) -> f64 {
        self.k_distances[p]
    }

    /// Neighbors of `p` within `k_distance(p)`, ranked.
    ///
    /// May hold more than `min_pts` entries when distances tie at the radius.
    #[inline]
    pub fn neighbors(&self, p: usize) -> &[Neighbor] {
        &self.neighborhoods[p]
    }

    /// The `k`-th ranked (1-indexed) neighbor of `p`.
    ///
    /// # Errors
    ///
    /// - `ClusterError::InvalidParameter` if `k` is 0 or exceeds `min_pts`
    pub fn kth_neighbor(&self, p: usize, k: usize) -> Result<Neighbor, ClusterError> {
        if k == 0 || k > self.min_pts {
            return Err(ClusterError::invalid_parameter(format!(
                "k must be in [1, min_pts={}], got {}",
                self.min_pts, k
            )));
        }
        // Ranks up to min_pts are always present in the stored prefix
        Ok(self.neighborhoods[p][k - 1])
    }
}

/// Distance of the `k`-th (1-indexed) entry of a ranked list, if present.
pub fn k_distance_of(ranked: &[Neighbor], k: usize) -> Option<f64> {
    k.checked_sub(1)
        .and_then(|i| ranked.get(i))
        .map(|nb| nb.distance)
}
