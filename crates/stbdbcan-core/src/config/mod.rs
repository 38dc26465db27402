//! Run configuration.
//!
//! # Loading Configuration
//!
//! ```rust,ignore
//! use stbdbcan_core::config::RunConfig;
//!
//! let config = RunConfig::from_file("stbdbcan.toml")?.with_env_overrides();
//! config.validate()?;
//! ```
//!
//! # TOML Structure
//!
//! ```toml
//! [stbof]
//! min_pts = 10
//! k = 5
//! upper_bound_fraction = 0.01
//!
//! [stbdbcan]
//! min_pts = 10
//! pct = 0.5
//! min_pts_cluster = 5
//! min_noise_percentage = 1.0
//!
//! [weights]
//! behavioral = [1.0, 2.0]
//! spatial = 1.0
//! temporal = 0.5
//!
//! [input]
//! behavioral = ["flow", "speed"]
//! id_column = "id"
//! timestamp_column = "timestamp"
//! temporal_entity = "17"
//! normalize = true
//!
//! [output]
//! emit_scores = false
//! ```
//!
//! Invalid values are reported, never replaced by defaults.

mod input;
mod weights;

#[cfg(test)]
mod tests;

pub use input::{InputConfig, OutputConfig};
pub use weights::WeightConfig;

use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clustering::{StBdbcanParams, StBofParams};
use crate::error::ConfigError;

/// Root configuration of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// ST-BOF parameters.
    #[serde(default)]
    pub stbof: StBofParams,

    /// ST-BDBCAN parameters.
    #[serde(default)]
    pub stbdbcan: StBdbcanParams,

    /// Distance weights.
    #[serde(default)]
    pub weights: WeightConfig,

    /// Dataset column selection and run mode.
    #[serde(default)]
    pub input: InputConfig,

    /// Result files.
    #[serde(default)]
    pub output: OutputConfig,
}

impl RunConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - `ConfigError::Parse` if TOML parsing fails
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("'{}': {}", path.display(), e)))
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// - `ConfigError::Parse` if TOML parsing fails
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to a TOML string.
    ///
    /// # Errors
    /// - `ConfigError::Serialize` if serialization fails
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Validate every section, returning the first error found.
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the offending section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stbof.validate().map_err(|e| ConfigError::Invalid {
            section: "stbof",
            message: e.to_string(),
        })?;
        self.stbdbcan.validate().map_err(|e| ConfigError::Invalid {
            section: "stbdbcan",
            message: e.to_string(),
        })?;
        self.input.validate().map_err(|message| ConfigError::Invalid {
            section: "input",
            message,
        })?;
        self.weights
            .validate(self.input.behavioral.len())
            .map_err(|message| ConfigError::Invalid {
                section: "weights",
                message,
            })?;
        Ok(())
    }

    /// Apply `STBDBCAN_*` environment variable overrides.
    ///
    /// # Supported Variables
    ///
    /// | Variable | Config Path | Type |
    /// |----------|-------------|------|
    /// | `STBDBCAN_STBOF_MIN_PTS` | `stbof.min_pts` | usize |
    /// | `STBDBCAN_STBOF_K` | `stbof.k` | usize |
    /// | `STBDBCAN_MIN_PTS` | `stbdbcan.min_pts` | usize |
    /// | `STBDBCAN_PCT` | `stbdbcan.pct` | f64 |
    /// | `STBDBCAN_MIN_PTS_CLUSTER` | `stbdbcan.min_pts_cluster` | usize |
    /// | `STBDBCAN_MIN_NOISE_PERCENTAGE` | `stbdbcan.min_noise_percentage` | f64 |
    /// | `STBDBCAN_SPATIAL_WEIGHT` | `weights.spatial` | f64 |
    /// | `STBDBCAN_TEMPORAL_WEIGHT` | `weights.temporal` | f64 |
    /// | `STBDBCAN_TEMPORAL_ENTITY` | `input.temporal_entity` | String |
    /// | `STBDBCAN_NORMALIZE` | `input.normalize` | bool |
    ///
    /// Unparsable values are ignored with a warning.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (same keys as
    /// [`RunConfig::with_env_overrides`]).
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        override_parsed(&lookup, "STBDBCAN_STBOF_MIN_PTS", &mut self.stbof.min_pts);
        override_parsed(&lookup, "STBDBCAN_STBOF_K", &mut self.stbof.k);
        override_parsed(&lookup, "STBDBCAN_MIN_PTS", &mut self.stbdbcan.min_pts);
        override_parsed(&lookup, "STBDBCAN_PCT", &mut self.stbdbcan.pct);
        override_parsed(
            &lookup,
            "STBDBCAN_MIN_PTS_CLUSTER",
            &mut self.stbdbcan.min_pts_cluster,
        );
        override_parsed(
            &lookup,
            "STBDBCAN_MIN_NOISE_PERCENTAGE",
            &mut self.stbdbcan.min_noise_percentage,
        );
        override_parsed(&lookup, "STBDBCAN_SPATIAL_WEIGHT", &mut self.weights.spatial);
        override_parsed(&lookup, "STBDBCAN_TEMPORAL_WEIGHT", &mut self.weights.temporal);
        override_parsed(&lookup, "STBDBCAN_NORMALIZE", &mut self.input.normalize);

        if let Some(entity) = lookup("STBDBCAN_TEMPORAL_ENTITY") {
            self.input.temporal_entity = Some(entity);
        }
        self
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<T>() {
            Ok(value) => *slot = value,
            Err(_) => warn!(key, value = %raw, "Ignoring unparsable override"),
        }
    }
}
