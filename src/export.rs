//! CSV and JSON output of derived tables.
//!
//! Column headers are the field names of the exported structs. Missing
//! labels are written as empty cells and undefined statistics (for example
//! the standard deviation of a single replicate) as `NaN`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::pipeline::PipelineStats;
use crate::standards::{DeltaUnits, ReferenceStandard, StandardTable};

/// Errors that can occur while exporting results
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error writing an output file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV writing error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Write rows as comma-separated values with a header line
pub fn write_csv<T, W>(rows: &[T], writer: W) -> Result<(), ExportError>
where
    T: Serialize,
    W: Write,
{
    let mut csv_writer = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write rows to a CSV file, replacing any existing file
pub fn write_csv_file<T, P>(rows: &[T], path: P) -> Result<(), ExportError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    write_csv(rows, BufWriter::new(file))?;
    log::debug!("Wrote {} rows to {}", rows.len(), path.as_ref().display());
    Ok(())
}

/// Provenance and statistics of one calibration run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Name of the producing tool
    pub tool: String,
    /// Tool version
    pub version: String,
    /// When the report was created (caller-supplied)
    pub created: DateTime<Utc>,
    /// Label of the input ratio table
    pub input: String,
    /// Unit convention of all delta values
    pub units: DeltaUnits,
    /// Reference standards used for calibration
    pub standards: Vec<ReferenceStandard>,
    /// Pipeline counts
    pub stats: PipelineStats,
}

impl RunReport {
    /// Build a report for a finished run
    pub fn new(
        input: impl Into<String>,
        created: DateTime<Utc>,
        standards: &StandardTable,
        stats: PipelineStats,
    ) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created,
            input: input.into(),
            units: standards.units(),
            standards: standards.iter().cloned().collect(),
            stats,
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as JSON to a file
    pub fn write_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(self.to_json()?.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(())
    }
}
