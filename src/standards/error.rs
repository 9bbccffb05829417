/// Errors in the reference-standard constant table
#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    /// I/O error reading a standards file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The table declares a unit convention other than per mille
    #[error("Unsupported delta units '{0}': delta_known must be given in per mille (units = \"permil\")")]
    UnsupportedUnits(String),

    /// `delta_known` outside the accepted per-mille range
    #[error("Invalid delta_known for {isotopocule}: {value} ({reason})")]
    InvalidDelta {
        /// Isotopocule of the offending entry
        isotopocule: String,
        /// The rejected value
        value: f64,
        /// Why the value was rejected
        reason: &'static str,
    },

    /// `ratio_known` is not a finite positive number
    #[error("Invalid ratio_known for {isotopocule}: {value}")]
    InvalidRatio {
        /// Isotopocule of the offending entry
        isotopocule: String,
        /// The rejected value
        value: f64,
    },

    /// More than one entry for the same isotopocule
    #[error("Duplicate reference standard for isotopocule {0}")]
    DuplicateStandard(String),

    /// No entry for an isotopocule that requires calibration
    #[error("No reference standard configured for isotopocule {0}")]
    MissingStandard(String),
}
