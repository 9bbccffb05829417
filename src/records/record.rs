use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an injection is a reference standard or an unknown sample.
///
/// The role is fixed when a row enters the crate and is never re-derived
/// from sample names afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Known reference-standard injection
    #[serde(alias = "ref", alias = "standard", alias = "Reference", alias = "REFERENCE")]
    Reference,
    /// Unknown sample injection
    #[serde(alias = "Sample", alias = "SAMPLE")]
    Sample,
}

impl Role {
    /// Build a role from the boolean `is_reference` convention
    pub fn from_is_reference(is_reference: bool) -> Self {
        if is_reference {
            Role::Reference
        } else {
            Role::Sample
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Reference => write!(f, "reference"),
            Role::Sample => write!(f, "sample"),
        }
    }
}

/// Join key identifying one independent bracketing series.
///
/// Bracketing never pairs records whose keys differ. The isotopocule is
/// always part of the key; `condition` and `basepeak` disambiguate series
/// that reuse injection numbers within one table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartitionKey {
    /// Isotopocule label
    pub isotopocule: String,
    /// Experimental condition (tuning, replicate series)
    pub condition: Option<String>,
    /// Basepeak identity used as ratio denominator
    pub basepeak: Option<String>,
}

impl PartitionKey {
    /// Key for an isotopocule with no further partitioning
    pub fn new(isotopocule: impl Into<String>) -> Self {
        Self {
            isotopocule: isotopocule.into(),
            condition: None,
            basepeak: None,
        }
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.isotopocule)?;
        if let Some(condition) = &self.condition {
            write!(f, " [condition={}]", condition)?;
        }
        if let Some(basepeak) = &self.basepeak {
            write!(f, " [basepeak={}]", basepeak)?;
        }
        Ok(())
    }
}

/// Per-injection summary of one isotopocule ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRecord {
    /// Acquisition order key
    pub injection: u32,
    /// Isotopocule label (e.g. "18O")
    pub isotopocule: String,
    /// Reference standard or unknown sample
    pub role: Role,
    /// Mean isotopocule / basepeak intensity ratio
    pub ratio: f64,
    /// Standard error of `ratio`
    pub ratio_sem: f64,
    /// Sample name, used to group replicates
    #[serde(default)]
    pub sample: Option<String>,
    /// Experimental condition label
    #[serde(default)]
    pub condition: Option<String>,
    /// Basepeak identity
    #[serde(default)]
    pub basepeak: Option<String>,
}

impl RatioRecord {
    /// Create a record with the given role and no partition labels
    pub fn new(
        injection: u32,
        isotopocule: impl Into<String>,
        role: Role,
        ratio: f64,
        ratio_sem: f64,
    ) -> Self {
        Self {
            injection,
            isotopocule: isotopocule.into(),
            role,
            ratio,
            ratio_sem,
            sample: None,
            condition: None,
            basepeak: None,
        }
    }

    /// Create a reference-standard record
    pub fn reference(injection: u32, isotopocule: impl Into<String>, ratio: f64, ratio_sem: f64) -> Self {
        Self::new(injection, isotopocule, Role::Reference, ratio, ratio_sem)
    }

    /// Create an unknown-sample record
    pub fn sample(injection: u32, isotopocule: impl Into<String>, ratio: f64, ratio_sem: f64) -> Self {
        Self::new(injection, isotopocule, Role::Sample, ratio, ratio_sem)
    }

    /// Set the sample name
    pub fn with_sample(mut self, sample: impl Into<String>) -> Self {
        self.sample = Some(sample.into());
        self
    }

    /// Set the experimental condition label
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Set the basepeak identity
    pub fn with_basepeak(mut self, basepeak: impl Into<String>) -> Self {
        self.basepeak = Some(basepeak.into());
        self
    }

    /// True for reference-standard injections
    pub fn is_reference(&self) -> bool {
        self.role == Role::Reference
    }

    /// The bracketing partition this record belongs to
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey {
            isotopocule: self.isotopocule.clone(),
            condition: self.condition.clone(),
            basepeak: self.basepeak.clone(),
        }
    }
}
