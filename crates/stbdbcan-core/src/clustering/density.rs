//! Local behavioral reachability density.
//!
//! Neighbors come from the contextual index; distances among them are
//! behavioral. For an observation p with contextual neighbors N(p):
//!
//! ```text
//! reach(p, q) = max(behavioral(p, q), behavioral(q, kth_neighbor(q)))
//! lrd(p)      = |N(p)| / Σ_{q ∈ N(p)} reach(p, q)
//! ```
//!
//! A zero sum means every neighbor coincides with p behaviorally; `lrd(p)` is
//! then `f64::INFINITY`, a well-defined sentinel that the ratio helpers below
//! handle explicitly.

use rayon::prelude::*;

use crate::distance::DistanceModel;
use crate::error::ClusterError;
use crate::types::Dataset;

use super::neighborhood::NeighborhoodIndex;

/// Compute `lrd(p)` for every observation.
///
/// `k` is the rank of the contextual neighbor used to cap reachability
/// (`1 <= k <= index.min_pts()`).
///
/// # Errors
///
/// - `ClusterError::InvalidParameter` if `k` is outside `[1, index.min_pts()]`
/// - `ClusterError::DimensionMismatch` if the index was built over another dataset
pub fn local_reachability_densities(
    dataset: &Dataset,
    model: &DistanceModel,
    index: &NeighborhoodIndex,
    k: usize,
) -> Result<Vec<f64>, ClusterError> {
    if index.len() != dataset.len() {
        return Err(ClusterError::dimension_mismatch(dataset.len(), index.len()));
    }
    let observations = dataset.observations();

    // Behavioral distance from q to its own k-th contextual neighbor
    let k_behavioral: Vec<f64> = (0..dataset.len())
        .map(|q| {
            index
                .kth_neighbor(q, k)
                .map(|nb| model.behavioral_distance(&observations[q], &observations[nb.index]))
        })
        .collect::<Result<_, _>>()?;

    let densities = (0..dataset.len())
        .into_par_iter()
        .map(|p| {
            let neighbors = index.neighbors(p);
            let reach_sum: f64 = neighbors
                .iter()
                .map(|nb| {
                    let direct = model.behavioral_distance(&observations[p], &observations[nb.index]);
                    direct.max(k_behavioral[nb.index])
                })
                .sum();

            if reach_sum > 0.0 {
                neighbors.len() as f64 / reach_sum
            } else {
                f64::INFINITY
            }
        })
        .collect();

    Ok(densities)
}

/// `numerator / denominator` with the infinite-density conventions:
/// `∞/∞ = 1`, `x/∞ = 0`, `∞/x = ∞` for finite x.
pub fn density_ratio(numerator: f64, denominator: f64) -> f64 {
    match (numerator.is_infinite(), denominator.is_infinite()) {
        (true, true) => 1.0,
        (false, true) => 0.0,
        (true, false) => f64::INFINITY,
        (false, false) => numerator / denominator,
    }
}

/// Relative-variation test between two densities.
///
/// Passes when `|a - b| <= pct * max(a, b)`, i.e. when the variation is within
/// tolerance measured against either point. Two infinite densities are
/// connected; an infinite and a finite one are not.
pub fn density_connected(a: f64, b: f64, pct: f64) -> bool {
    match (a.is_infinite(), b.is_infinite()) {
        (true, true) => true,
        (false, false) => (a - b).abs() <= pct * a.max(b),
        _ => false,
    }
}
