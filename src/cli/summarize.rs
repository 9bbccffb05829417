use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use isodelta::export::write_csv_file;
use isodelta::scans::{read_scans, summarize_scans, Sequence};

use super::Config;

/// Summarize per-scan ratios into a per-injection ratio table
pub fn run(scans: PathBuf, sequence: PathBuf, output: PathBuf, config: Config) -> Result<()> {
    for path in [&scans, &sequence] {
        if !path.exists() {
            anyhow::bail!("Input file does not exist: {}", path.display());
        }
    }

    info!("isodelta - Scan Summary");
    info!("=======================");
    info!("Scans:    {}", scans.display());
    info!("Sequence: {}", sequence.display());
    info!("Output:   {}", output.display());

    let options = config.summarize_options();
    info!("Minimum scans per group: {}", options.min_scans);

    let records = read_scans(&scans)
        .with_context(|| format!("Failed to read scans from {}", scans.display()))?;
    let sequence = Sequence::from_path(&sequence)
        .with_context(|| format!("Failed to read sequence sheet {}", sequence.display()))?;

    let table = summarize_scans(&records, &sequence, &options).context("Scan summary failed")?;

    write_csv_file(table.records(), &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Summarized {} scans into {} injection records ({} samples)",
        records.len(),
        table.len(),
        table.sample_count()
    );

    Ok(())
}
