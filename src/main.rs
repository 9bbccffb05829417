//! # isodelta
//!
//! Command-line front end for bracketed isotope delta calibration.
//!
//! ## Usage
//!
//! ```bash
//! # Per-scan ratios to a per-injection ratio table
//! isodelta summarize scans.csv sequence.csv -o ratios.csv
//!
//! # Check inputs, then calibrate
//! isodelta validate ratios.csv --config isodelta.toml
//! isodelta -v calculate ratios.csv --config isodelta.toml -o results/
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::dispatch(cli)
}
