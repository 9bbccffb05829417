use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use isodelta::export::{write_csv_file, RunReport};
use isodelta::pipeline;
use isodelta::records::RatioTable;

use super::Config;

/// Calibrate a ratio table and write the result files
pub fn run(input: PathBuf, config: Config, output: PathBuf) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    info!("isodelta - Bracketed Delta Calculation");
    info!("======================================");
    info!("Input:  {}", input.display());
    info!("Output: {}", output.display());

    let standards = config.standards()?;
    for standard in standards.iter() {
        info!(
            "Standard {}: delta_known = {} {}",
            standard.isotopocule,
            standard.delta_known,
            standards.units()
        );
    }

    let table = RatioTable::from_path(&input)
        .with_context(|| format!("Failed to read ratio table {}", input.display()))?;
    let result = pipeline::run(&table, &standards).context("Calibration failed")?;

    std::fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    let deltas_path = output.join("deltas.csv");
    write_csv_file(&result.deltas, &deltas_path)
        .with_context(|| format!("Failed to write {}", deltas_path.display()))?;
    info!("  Deltas: {} rows -> {}", result.deltas.len(), deltas_path.display());

    if config.output.summary {
        let summary_path = output.join("summary.csv");
        write_csv_file(&result.summaries, &summary_path)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        info!(
            "  Summary: {} groups -> {}",
            result.summaries.len(),
            summary_path.display()
        );
    }

    if config.output.report {
        let report_path = output.join("report.json");
        let report = RunReport::new(
            input.display().to_string(),
            chrono::Utc::now(),
            &standards,
            result.stats.clone(),
        );
        report
            .write_json_file(&report_path)
            .with_context(|| format!("Failed to write {}", report_path.display()))?;
        info!("  Report: {}", report_path.display());
    }

    if result.stats.unbracketed_samples > 0 {
        log::warn!(
            "{} sample injections were not bracketed and were excluded",
            result.stats.unbracketed_samples
        );
    }
    println!("{}", result.stats);

    Ok(())
}
