//! # Scan Summarizer
//!
//! Turns per-scan isotopocule ratios into the per-injection
//! [`RatioTable`](crate::records::RatioTable) consumed by the bracketing
//! engine.
//!
//! Scan rows arrive already flagged by the upstream analysis library
//! (outliers, satellite peaks, weak isotopocules); flagged scans are
//! dropped here, never re-evaluated. A sequence sheet assigns every raw
//! file its injection number and its role.
//!
//! ## Scan CSV
//!
//! | Column | Required | Description |
//! |--------|----------|-------------|
//! | file | Yes | Raw file name |
//! | scan | Yes | Scan number |
//! | isotopocule | Yes | Isotopocule label |
//! | ratio | Yes | Ratio to the basepeak in this scan |
//! | flagged | No | Generic exclusion flag |
//! | is_outlier | No | Outlier flag |
//! | is_satellite_peak | No | Satellite-peak flag |
//! | is_weak_isotopocule | No | Weak-isotopocule flag |
//!
//! ## Sequence CSV
//!
//! `file, injection, role[, sample, condition, basepeak]`

mod error;
mod sequence;


use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::aggregate::{mean, sample_std};
use crate::records::{delimiter_for, deserialize_flag, RatioRecord, RatioTable};

pub use error::ScanError;
pub use sequence::{Sequence, SequenceEntry};

/// Default minimum number of usable scans per file and isotopocule
pub const DEFAULT_MIN_SCANS: usize = 2;

/// One scan's ratio as produced by the upstream flagging step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanRecord {
    /// Raw file name
    pub file: String,
    /// Scan number
    pub scan: u32,
    /// Isotopocule label
    pub isotopocule: String,
    /// Isotopocule / basepeak ratio in this scan; `NaN` when the cell is
    /// empty or `NA`
    #[serde(deserialize_with = "deserialize_ratio")]
    pub ratio: f64,
    /// Generic exclusion flag
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub flagged: Option<bool>,
    /// Outlier flag
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_outlier: Option<bool>,
    /// Satellite-peak flag
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_satellite_peak: Option<bool>,
    /// Weak-isotopocule flag
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_weak_isotopocule: Option<bool>,
}

impl ScanRecord {
    /// Create an unflagged scan
    pub fn new(file: impl Into<String>, scan: u32, isotopocule: impl Into<String>, ratio: f64) -> Self {
        Self {
            file: file.into(),
            scan,
            isotopocule: isotopocule.into(),
            ratio,
            flagged: None,
            is_outlier: None,
            is_satellite_peak: None,
            is_weak_isotopocule: None,
        }
    }

    /// Whether any upstream flag excludes this scan
    pub fn is_flagged(&self) -> bool {
        [
            self.flagged,
            self.is_outlier,
            self.is_satellite_peak,
            self.is_weak_isotopocule,
        ]
        .iter()
        .any(|flag| flag.unwrap_or(false))
    }

    /// Whether the scan contributes to the injection mean
    pub fn is_usable(&self) -> bool {
        !self.is_flagged() && self.ratio.is_finite() && self.ratio > 0.0
    }
}

/// Scans without a measured ratio load as `NaN` and are dropped as unusable
fn deserialize_ratio<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(f64::NAN),
        Some(v) if v.eq_ignore_ascii_case("na") => Ok(f64::NAN),
        Some(v) => v
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid ratio '{}'", v))),
    }
}

/// Read scan records from a CSV (or `.tsv`) file
pub fn read_scans<P: AsRef<Path>>(path: P) -> Result<Vec<ScanRecord>, ScanError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_scans_from_reader(BufReader::new(file), delimiter_for(path))
}

/// Read scan records from a reader
pub fn read_scans_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Vec<ScanRecord>, ScanError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut scans = Vec::new();
    for row in csv_reader.deserialize() {
        scans.push(row?);
    }
    Ok(scans)
}

/// Options for [`summarize_scans`].
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Groups with fewer usable scans are skipped
    pub min_scans: usize,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            min_scans: DEFAULT_MIN_SCANS,
        }
    }
}

/// Summarize per-scan ratios into one record per file and isotopocule.
///
/// `ratio` is the mean over usable scans and `ratio_sem` the sample
/// standard deviation divided by `sqrt(n)` (zero when a single scan is
/// allowed through `min_scans = 1`). Records are ordered by injection,
/// then file, then isotopocule.
pub fn summarize_scans(
    scans: &[ScanRecord],
    sequence: &Sequence,
    options: &SummarizeOptions,
) -> Result<RatioTable, ScanError> {
    let mut grouped: BTreeMap<(u32, &str, &str), (&SequenceEntry, Vec<f64>)> = BTreeMap::new();
    let mut excluded = 0usize;

    for scan in scans {
        let entry = sequence
            .get(&scan.file)
            .ok_or_else(|| ScanError::UnknownFile(scan.file.clone()))?;

        let group = grouped
            .entry((entry.injection, scan.file.as_str(), scan.isotopocule.as_str()))
            .or_insert_with(|| (entry, Vec::new()));

        if scan.is_usable() {
            group.1.push(scan.ratio);
        } else {
            excluded += 1;
        }
    }

    log::info!(
        "Summarizing {} scans ({} excluded by flags or invalid ratios)",
        scans.len(),
        excluded
    );

    let mut records = Vec::with_capacity(grouped.len());
    for ((injection, _, isotopocule), (entry, ratios)) in grouped {
        if ratios.len() < options.min_scans.max(1) {
            log::warn!(
                "Skipping {} / {} (injection {}): {} usable scans, {} required",
                entry.file,
                isotopocule,
                injection,
                ratios.len(),
                options.min_scans
            );
            continue;
        }

        let ratio_sem = if ratios.len() > 1 {
            sample_std(&ratios) / (ratios.len() as f64).sqrt()
        } else {
            0.0
        };

        records.push(RatioRecord {
            injection,
            isotopocule: isotopocule.to_string(),
            role: entry.role,
            ratio: mean(&ratios),
            ratio_sem,
            sample: entry.sample.clone(),
            condition: entry.condition.clone(),
            basepeak: entry.basepeak.clone(),
        });
    }

    Ok(RatioTable::new(records)?)
}
