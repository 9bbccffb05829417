use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use isodelta::records::RatioTable;
use isodelta::standards::StandardTable;
use isodelta::validator::validate_inputs;

use super::Config;

/// Validate a ratio table against its configured standards
pub fn run(input: PathBuf, config: Config) -> Result<()> {
    info!("isodelta Validator");
    info!("==================");
    info!("File: {}", input.display());
    info!("");

    match load_inputs(&input, &config) {
        Ok((table, standards)) => {
            let report = validate_inputs(input.display().to_string(), &table, &standards);

            println!("{}", report.format_colored());

            // Exit with error code if validation failed
            if report.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Validation error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn load_inputs(input: &Path, config: &Config) -> Result<(RatioTable, StandardTable)> {
    let standards = config.standards()?;
    let table = RatioTable::from_path(input)
        .with_context(|| format!("Failed to read ratio table {}", input.display()))?;
    Ok((table, standards))
}
