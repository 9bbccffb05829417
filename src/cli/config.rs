//! TOML configuration file support.
//!
//! Reference standards and output switches live in one file:
//!
//! ```toml
//! # isodelta.toml
//! [calibration]
//! units = "permil"
//! strict = false
//!
//! [[calibration.standards]]
//! isotopocule = "18O"
//! delta_known = 57.5
//! ratio_known = 0.0020052
//!
//! [summarize]
//! min_scans = 2
//!
//! [output]
//! summary = true
//! report = true
//! ```

use anyhow::{Context, Result};
use isodelta::scans::{SummarizeOptions, DEFAULT_MIN_SCANS};
use isodelta::standards::{StandardTable, StandardsFile};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure for isodelta.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Unit convention and reference standards.
    #[serde(default)]
    pub calibration: StandardsFile,

    /// Settings for the summarize command.
    #[serde(default)]
    pub summarize: SummarizeConfig,

    /// Which optional outputs the calculate command writes.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration for the summarize command.
#[derive(Debug, Default, Deserialize)]
pub struct SummarizeConfig {
    /// Minimum usable scans per file and isotopocule.
    pub min_scans: Option<usize>,
}

/// Configuration for calculate outputs.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write the replicate summary table.
    pub summary: bool,

    /// Write the JSON run report.
    pub report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary: true,
            report: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Validate the calibration section into a standards table.
    pub fn standards(&self) -> Result<StandardTable> {
        StandardTable::try_from(self.calibration.clone()).context("Invalid [calibration] section")
    }

    /// Options for the scan summarizer.
    pub fn summarize_options(&self) -> SummarizeOptions {
        SummarizeOptions {
            min_scans: self.summarize.min_scans.unwrap_or(DEFAULT_MIN_SCANS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [calibration]
            units = "permil"

            [[calibration.standards]]
            isotopocule = "18O"
            delta_known = 57.5
            ratio_known = 0.0020052
            name = "in-house nitrate"

            [[calibration.standards]]
            isotopocule = "15N"
            delta_known = -1.8

            [summarize]
            min_scans = 5

            [output]
            summary = false
        "#;

        let config = Config::from_str(toml).unwrap();
        let standards = config.standards().unwrap();
        assert_eq!(standards.len(), 2);
        assert_eq!(standards.get("18O").unwrap().ratio_known, Some(0.0020052));
        assert_eq!(config.summarize_options().min_scans, 5);
        assert!(!config.output.summary);
        assert!(config.output.report);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert!(config.standards().unwrap().is_empty());
        assert_eq!(config.summarize_options().min_scans, DEFAULT_MIN_SCANS);
        assert!(config.output.summary);
        assert!(config.output.report);
    }

    #[test]
    fn test_strict_calibration() {
        let toml = r#"
            [calibration]
            strict = true

            [[calibration.standards]]
            isotopocule = "18O"
            delta_known = 0.0575
        "#;

        let config = Config::from_str(toml).unwrap();
        assert!(config.calibration.strict);
        assert!(config.standards().is_err());
    }

    #[test]
    fn test_rejects_fraction_units() {
        let toml = r#"
            [calibration]
            units = "fraction"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert!(config.standards().is_err());
    }
}
