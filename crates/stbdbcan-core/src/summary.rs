//! Run summary: effective parameters and headline statistics.
//!
//! Serialized to JSON as-is, and rendered as a plain-text report.

use std::fmt::Write as _;

use serde::Serialize;

use crate::clustering::{NoiseValidation, StBdbcanParams, StBofParams};
use crate::distance::Weights;

/// ST-BOF part of the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StBofSummary {
    /// Parameters used.
    pub params: StBofParams,
    /// Run-wide maximum score.
    pub max: f64,
    /// Score at the top `params.upper_bound_fraction` rank.
    pub percentile_upper_bound: f64,
    /// 1-based rank of the observation defining `percentile_upper_bound`.
    pub percentile_rank: usize,
    /// Observations scoring above `percentile_upper_bound`.
    pub outliers: usize,
    /// Wall time of the ST-BOF phase.
    pub elapsed_ms: u64,
}

/// ST-BDBCAN part of the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteringSummary {
    /// Parameters used.
    pub params: StBdbcanParams,
    /// Clusters surviving pruning.
    pub n_clusters: usize,
    /// Size of each surviving cluster, by cluster id.
    pub cluster_sizes: Vec<usize>,
    /// Clusters dissolved for being too small.
    pub pruned_clusters: usize,
    /// Core points before pruning.
    pub core_points: usize,
    /// Wall time of the ST-BDBCAN phase.
    pub elapsed_ms: u64,
}

/// Everything reported about one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// `spatiotemporal` or `temporal(<entity>)`.
    pub mode: String,
    /// Observations processed.
    pub points: usize,
    /// Behavioral attribute names.
    pub attributes: Vec<String>,
    /// Whether behavioral values were min-max scaled.
    pub normalized: bool,
    /// Weights bound for the run.
    pub weights: Weights,
    /// Outlier factor statistics.
    pub stbof: StBofSummary,
    /// Clustering statistics.
    pub clustering: ClusteringSummary,
    /// Noise-ratio acceptance check.
    pub validation: NoiseValidation,
}

impl RunSummary {
    /// Noise share as a percentage.
    pub fn noise_percentage(&self) -> f64 {
        self.validation.noise_ratio * 100.0
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report.
    pub fn render_report(&self) -> String {
        let rule = "------------------------------------------------";
        let mut r = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(r, "Mode: {}", self.mode);
        let _ = writeln!(
            r,
            "Using {} points, behavioral attributes: {}",
            self.points,
            self.attributes.join(", ")
        );
        let _ = writeln!(
            r,
            "Weights: behavioral={:?}, spatial={}, temporal={}{}",
            self.weights.behavioral,
            self.weights.spatial,
            self.weights.temporal,
            if self.normalized { " (min-max scaled)" } else { "" }
        );
        let _ = writeln!(r, "{}", rule);

        let s = &self.stbof;
        let _ = writeln!(r, "ST-Behavioral Outlier Factor");
        let _ = writeln!(r, "Parameters: minPts={}, k={}", s.params.min_pts, s.params.k);
        let _ = writeln!(r, "Elapsed time: {} ms", s.elapsed_ms);
        let _ = writeln!(r, "Maximum ST-BOF = {}", s.max);
        let _ = writeln!(
            r,
            "ST-BOFUB (ST-BOF of point ranked {}) = {}",
            s.percentile_rank, s.percentile_upper_bound
        );
        let _ = writeln!(r, "Points above ST-BOFUB: {}", s.outliers);
        let _ = writeln!(r, "{}", rule);

        let c = &self.clustering;
        let _ = writeln!(r, "ST-BDBCAN");
        let _ = writeln!(
            r,
            "Parameters: pct={}, BDBCAN_minPts={}, minPts_cluster={}",
            c.params.pct, c.params.min_pts, c.params.min_pts_cluster
        );
        let _ = writeln!(r, "Elapsed time: {} ms", c.elapsed_ms);
        let _ = writeln!(r, "Number of clusters = {}", c.n_clusters);
        let _ = writeln!(r, "Cluster sizes: {:?}", c.cluster_sizes);
        let _ = writeln!(r, "Pruned clusters: {}", c.pruned_clusters);
        let _ = writeln!(r, "Core points: {}", c.core_points);
        let _ = writeln!(r, "Noise: {}", self.validation.noise_count);
        let _ = writeln!(r, "{}", rule);

        let _ = writeln!(
            r,
            "Percentage of noise points = {:.2}",
            self.noise_percentage()
        );
        let _ = writeln!(
            r,
            "Noise validation: {} (threshold {:.2}%)",
            if self.validation.accepted {
                "accepted"
            } else {
                "REJECTED"
            },
            self.validation.threshold * 100.0
        );
        r
    }
}
