//! Noise-ratio acceptance check for a clustering run.
//!
//! # Acceptance
//!
//! noise_ratio = |{p : label(p) = NOISE}| / n
//!
//! The run is accepted when `noise_ratio <= threshold`. The check is
//! advisory: labels are never changed, a rejection is only reported.

use serde::Serialize;
use tracing::{info, warn};

use super::stbdbcan::NOISE;

/// Outcome of the noise-ratio check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoiseValidation {
    /// Observations labeled noise.
    pub noise_count: usize,
    /// Observations labeled.
    pub total: usize,
    /// `noise_count / total`, 0 for an empty labeling.
    pub noise_ratio: f64,
    /// Threshold the ratio was checked against.
    pub threshold: f64,
    /// True when `noise_ratio <= threshold`.
    pub accepted: bool,
}

/// Check the share of noise labels against `threshold`.
///
/// # Example
///
/// ```
/// use stbdbcan_core::clustering::validate_noise_ratio;
///
/// let v = validate_noise_ratio(&[0, 0, -1, 1], 0.3);
/// assert_eq!(v.noise_count, 1);
/// assert!(v.accepted);
/// ```
pub fn validate_noise_ratio(labels: &[i32], threshold: f64) -> NoiseValidation {
    let total = labels.len();
    let noise_count = labels.iter().filter(|&&l| l == NOISE).count();
    let noise_ratio = if total == 0 {
        0.0
    } else {
        noise_count as f64 / total as f64
    };
    let accepted = noise_ratio <= threshold;

    if accepted {
        info!(noise_count, total, noise_ratio, threshold, "Noise ratio accepted");
    } else {
        warn!(
            noise_count,
            total, noise_ratio, threshold, "Noise ratio exceeds acceptance threshold"
        );
    }

    NoiseValidation {
        noise_count,
        total,
        noise_ratio,
        threshold,
        accepted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_and_acceptance() {
        let labels = [0, -1, -1, 1, 0, 0, 1, 1, 0, -1];
        let v = validate_noise_ratio(&labels, 0.25);
        assert_eq!(v.noise_count, 3);
        assert_eq!(v.total, 10);
        assert!((v.noise_ratio - 0.3).abs() < 1e-12);
        assert!(!v.accepted);

        assert!(validate_noise_ratio(&labels, 0.3).accepted);
        println!("[PASS] test_ratio_and_acceptance - ratio={}", v.noise_ratio);
    }

    #[test]
    fn test_default_threshold_accepts_all_noise() {
        let v = validate_noise_ratio(&[-1, -1, -1], 1.0);
        assert_eq!(v.noise_ratio, 1.0);
        assert!(v.accepted);
    }

    #[test]
    fn test_empty_labeling() {
        let v = validate_noise_ratio(&[], 0.0);
        assert_eq!(v.total, 0);
        assert_eq!(v.noise_ratio, 0.0);
        assert!(v.accepted);
    }
}
