use super::PartitionKey;

/// Errors that can occur while building a ratio table
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// I/O error reading the ratio file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// A row carries neither a `role` nor an `is_reference` column value
    #[error("Row {row}: missing role (expected a 'role' or 'is_reference' column)")]
    MissingRole {
        /// 1-based data row number
        row: usize,
    },

    /// A row carries both role columns and they disagree
    #[error("Row {row}: 'role' and 'is_reference' disagree")]
    ConflictingRole {
        /// 1-based data row number
        row: usize,
    },

    /// A record has an empty isotopocule label
    #[error("Injection {injection}: empty isotopocule label")]
    EmptyIsotopocule {
        /// Injection of the offending record
        injection: u32,
    },

    /// A numeric field is outside its domain
    #[error("Injection {injection} ({isotopocule}): invalid {field} = {value}")]
    InvalidValue {
        /// Injection of the offending record
        injection: u32,
        /// Isotopocule of the offending record
        isotopocule: String,
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Two records share an injection number within one partition
    #[error("Duplicate injection {injection} in partition {partition}")]
    DuplicateInjection {
        /// Partition in which the collision occurred
        partition: PartitionKey,
        /// The repeated injection number
        injection: u32,
    },
}
