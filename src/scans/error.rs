use crate::records::TableError;

/// Errors that can occur while summarizing per-scan ratios
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// I/O error reading a scan or sequence file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// A scan refers to a file that the sequence sheet does not list
    #[error("File '{0}' is not listed in the sequence sheet")]
    UnknownFile(String),

    /// The sequence sheet lists a file more than once
    #[error("File '{0}' appears more than once in the sequence sheet")]
    DuplicateFile(String),

    /// The summarized ratios do not form a valid table
    #[error("Invalid ratio table: {0}")]
    TableError(#[from] TableError),
}
