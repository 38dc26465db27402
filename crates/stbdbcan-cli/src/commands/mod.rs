//! CLI command handlers
//!
//! # Modules
//!
//! - `run`: load inputs, score, cluster, write results
//! - `config`: print or validate the effective configuration

pub mod config;
pub mod run;

use std::path::PathBuf;

use clap::Args;
use stbdbcan_core::{RunConfig, StError};
use tracing::debug;

/// Configuration source shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// TOML configuration file
    #[arg(short, long, env = "STBDBCAN_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ConfigSource {
    /// File values (or defaults), then `STBDBCAN_*` environment overrides.
    pub fn load(&self) -> Result<RunConfig, StError> {
        let config = match &self.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                RunConfig::from_file(path)?
            }
            None => RunConfig::default(),
        };
        Ok(config.with_env_overrides())
    }
}
