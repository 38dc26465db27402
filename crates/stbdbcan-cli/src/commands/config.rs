//! `config` commands: inspect the effective configuration.
//!
//! - `config show`: print the merged configuration as TOML
//! - `config validate`: validate it and report the first problem

use clap::Subcommand;
use tracing::error;

use stbdbcan_core::StError;

use super::ConfigSource;
use crate::error::CliExitCode;

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (file, then environment) as TOML
    Show(ConfigSource),
    /// Validate the effective configuration
    Validate(ConfigSource),
}

/// Handle config command dispatch
pub fn handle_config_command(cmd: ConfigCommands) -> i32 {
    let result = match cmd {
        ConfigCommands::Show(source) => show(&source),
        ConfigCommands::Validate(source) => validate(&source),
    };
    match result {
        Ok(()) => CliExitCode::Success.into(),
        Err(e) => {
            error!(category = e.category(), "{}", e);
            eprintln!("Error: {}", e);
            CliExitCode::from(&e).into()
        }
    }
}

fn show(source: &ConfigSource) -> Result<(), StError> {
    let config = source.load()?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn validate(source: &ConfigSource) -> Result<(), StError> {
    source.load()?.validate()?;
    println!("Configuration is valid");
    Ok(())
}
