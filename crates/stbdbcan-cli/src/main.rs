//! ST-BDBCAN CLI
//!
//! Spatio-temporal behavioral outlier scoring and density clustering from the
//! command line.
//!
//! # Commands
//!
//! - `run`: score (ST-BOF) and cluster (ST-BDBCAN) a dataset CSV, write results
//! - `config show`: print the effective configuration
//! - `config validate`: check the effective configuration
//!
//! # Exit Codes
//! - 0: Success
//! - 1: Input or I/O error
//! - 2: Invalid configuration or parameters

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod error;

/// ST-BDBCAN - spatio-temporal behavioral outliers and clusters
#[derive(Parser)]
#[command(name = "stbdbcan")]
#[command(version)]
#[command(about = "Spatio-temporal behavioral outlier factor and density-based clustering")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score and cluster a dataset
    Run(commands::run::RunArgs),
    /// Configuration inspection commands
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Commands::Run(args) => commands::run::run_command(args),
        Commands::Config { action } => commands::config::handle_config_command(action),
    };

    std::process::exit(exit_code);
}
