use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod calculate;
mod config;
mod summarize;
mod validate;

pub use config::Config;

/// isodelta - Bracketed isotope delta calibration for Orbitrap ratios
#[derive(Parser)]
#[command(name = "isodelta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calibrate sample ratios against bracketing reference injections
    Calculate {
        /// Per-injection ratio table (CSV, or TSV by extension)
        #[arg(value_name = "RATIOS")]
        input: PathBuf,

        /// TOML file with reference standards
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Output directory for deltas.csv, summary.csv and report.json
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,
    },

    /// Summarize per-scan ratios into a per-injection ratio table
    Summarize {
        /// Per-scan ratio table
        #[arg(value_name = "SCANS")]
        scans: PathBuf,

        /// Sequence sheet assigning injections and roles to files
        #[arg(value_name = "SEQUENCE")]
        sequence: PathBuf,

        /// Output ratio table path
        #[arg(short, long, value_name = "FILE", default_value = "ratios.csv")]
        output: PathBuf,

        /// Optional TOML configuration (reads [summarize])
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Check a ratio table and its standards before calibrating
    Validate {
        /// Per-injection ratio table
        #[arg(value_name = "RATIOS")]
        input: PathBuf,

        /// TOML file with reference standards
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    match cli.command {
        Commands::Calculate {
            input,
            config,
            output,
        } => calculate::run(input, load_config(&config)?, output),
        Commands::Summarize {
            scans,
            sequence,
            output,
            config,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => Config::default(),
            };
            summarize::run(scans, sequence, output, config)
        }
        Commands::Validate { input, config } => validate::run(input, load_config(&config)?),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Config file does not exist: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Loading {}", path.display()))
}
