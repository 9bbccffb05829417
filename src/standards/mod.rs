//! # Reference Standards
//!
//! Certified delta values of the bracketing reference material, one entry
//! per isotopocule. All `delta_known` values are **per mille**; the
//! fractional convention is rejected rather than converted.
//!
//! ```toml
//! units = "permil"
//!
//! [[standards]]
//! isotopocule = "18O"
//! delta_known = 57.5
//! ratio_known = 0.0020052
//! name = "in-house nitrate"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

mod error;

pub use error::StandardsError;

/// Largest accepted |delta_known| in per mille
pub const MAX_ABS_DELTA_PERMIL: f64 = 5000.0;

/// Below this non-zero magnitude a per-mille value looks like a fraction
pub const SUSPICIOUS_DELTA_PERMIL: f64 = 1.0;

/// Unit convention of `delta_known`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DeltaUnits {
    /// Parts per thousand
    #[default]
    #[serde(rename = "permil")]
    PerMil,
}

impl DeltaUnits {
    /// Parse a unit declaration; only per-mille spellings are accepted
    pub fn parse(s: &str) -> Result<Self, StandardsError> {
        match s.trim().to_lowercase().as_str() {
            "permil" | "per mil" | "per_mil" | "permille" | "‰" => Ok(DeltaUnits::PerMil),
            other => Err(StandardsError::UnsupportedUnits(other.to_string())),
        }
    }
}

impl fmt::Display for DeltaUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeltaUnits::PerMil => write!(f, "permil"),
        }
    }
}

/// Certified constants of the reference standard for one isotopocule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStandard {
    /// Isotopocule label
    pub isotopocule: String,
    /// Certified delta value, per mille
    pub delta_known: f64,
    /// Absolute ratio on the international scale, if known
    #[serde(default)]
    pub ratio_known: Option<f64>,
    /// Name of the reference material
    #[serde(default)]
    pub name: Option<String>,
}

impl ReferenceStandard {
    /// Create a standard with only a certified delta value
    pub fn new(isotopocule: impl Into<String>, delta_known: f64) -> Self {
        Self {
            isotopocule: isotopocule.into(),
            delta_known,
            ratio_known: None,
            name: None,
        }
    }

    /// Set the absolute reference ratio
    pub fn with_ratio_known(mut self, ratio_known: f64) -> Self {
        self.ratio_known = Some(ratio_known);
        self
    }

    /// Set the reference material name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `delta_known + 1000`, the ratio-domain multiplier used by calibration
    pub fn multiplier(&self) -> f64 {
        self.delta_known + 1000.0
    }

    /// Non-zero but small enough that it was probably entered as a fraction
    pub fn is_suspiciously_small(&self) -> bool {
        self.delta_known != 0.0 && self.delta_known.abs() < SUSPICIOUS_DELTA_PERMIL
    }

    fn validate(&self) -> Result<(), StandardsError> {
        let invalid = |reason| StandardsError::InvalidDelta {
            isotopocule: self.isotopocule.clone(),
            value: self.delta_known,
            reason,
        };

        if !self.delta_known.is_finite() {
            return Err(invalid("not a finite number"));
        }
        if self.delta_known <= -1000.0 {
            return Err(invalid("must be greater than -1000 permil"));
        }
        if self.delta_known.abs() > MAX_ABS_DELTA_PERMIL {
            return Err(invalid("magnitude exceeds the per-mille range"));
        }

        if let Some(ratio) = self.ratio_known {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(StandardsError::InvalidRatio {
                    isotopocule: self.isotopocule.clone(),
                    value: ratio,
                });
            }
        }

        Ok(())
    }
}

/// On-disk layout of a standards table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandardsFile {
    /// Declared unit convention; per mille when omitted
    #[serde(default)]
    pub units: Option<String>,
    /// Reject fraction-like `delta_known` values instead of warning
    #[serde(default)]
    pub strict: bool,
    /// Standard entries
    #[serde(default)]
    pub standards: Vec<ReferenceStandard>,
}

/// Validated lookup table of reference standards keyed by isotopocule.
#[derive(Debug, Clone, Default)]
pub struct StandardTable {
    units: DeltaUnits,
    standards: BTreeMap<String, ReferenceStandard>,
}

impl StandardTable {
    /// Validate entries and build a per-mille standards table.
    ///
    /// Values that look like fractions are accepted with a logged warning;
    /// see [`StandardTable::suspicious`] and [`StandardTable::strict`].
    pub fn new(entries: Vec<ReferenceStandard>) -> Result<Self, StandardsError> {
        Self::build(entries, false)
    }

    /// Like [`StandardTable::new`], but a non-zero `delta_known` below
    /// 1 permil in magnitude is rejected instead of logged
    pub fn strict(entries: Vec<ReferenceStandard>) -> Result<Self, StandardsError> {
        Self::build(entries, true)
    }

    fn build(entries: Vec<ReferenceStandard>, strict: bool) -> Result<Self, StandardsError> {
        let mut standards = BTreeMap::new();

        for entry in entries {
            entry.validate()?;
            if entry.is_suspiciously_small() {
                if strict {
                    return Err(StandardsError::InvalidDelta {
                        isotopocule: entry.isotopocule,
                        value: entry.delta_known,
                        reason: "looks like a fraction, expected per mille",
                    });
                }
                log::warn!(
                    "delta_known for {} is {} permil; check that it was not entered as a fraction",
                    entry.isotopocule,
                    entry.delta_known
                );
            }
            if standards.contains_key(&entry.isotopocule) {
                return Err(StandardsError::DuplicateStandard(entry.isotopocule));
            }
            standards.insert(entry.isotopocule.clone(), entry);
        }

        Ok(Self {
            units: DeltaUnits::PerMil,
            standards,
        })
    }

    /// Load a standards table from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StandardsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a standards table from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, StandardsError> {
        let file: StandardsFile = toml::from_str(content)?;
        Self::try_from(file)
    }

    /// Unit convention of the table
    pub fn units(&self) -> DeltaUnits {
        self.units
    }

    /// Look up the standard for an isotopocule
    pub fn get(&self, isotopocule: &str) -> Option<&ReferenceStandard> {
        self.standards.get(isotopocule)
    }

    /// Look up the standard for an isotopocule, failing if absent
    pub fn require(&self, isotopocule: &str) -> Result<&ReferenceStandard, StandardsError> {
        self.get(isotopocule)
            .ok_or_else(|| StandardsError::MissingStandard(isotopocule.to_string()))
    }

    /// Iterate over entries sorted by isotopocule
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceStandard> {
        self.standards.values()
    }

    /// Entries whose `delta_known` was probably entered as a fraction
    pub fn suspicious(&self) -> impl Iterator<Item = &ReferenceStandard> {
        self.iter().filter(|s| s.is_suspiciously_small())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.standards.len()
    }

    /// Whether the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }
}

impl TryFrom<StandardsFile> for StandardTable {
    type Error = StandardsError;

    fn try_from(file: StandardsFile) -> Result<Self, Self::Error> {
        if let Some(units) = &file.units {
            DeltaUnits::parse(units)?;
        }
        Self::build(file.standards, file.strict)
    }
}
