//! # Delta Calculator
//!
//! Converts bracketed ratio measurements into calibrated delta values on
//! the international scale, in per mille.
//!
//! For a sample ratio `r` (SEM `s_r`) bracketed by references `r_b`, `r_a`
//! (SEMs `s_b`, `s_a`) and a standard with certified `delta_known`:
//!
//! ```text
//! ref_ratio     = (r_b + r_a) / 2
//! ref_ratio_sem = 0.5 * sqrt(s_b^2 + s_a^2)
//! delta         = (r / ref_ratio) * (delta_known + 1000) - 1000
//! delta_sem     = (delta + 1000) * sqrt((s_r / r)^2 + (ref_ratio_sem / ref_ratio)^2)
//! ```
//!
//! The sample and bracketing ratios are treated as independent relative
//! error contributions combined in quadrature.

use serde::{Deserialize, Serialize};

use crate::bracket::{match_brackets, BracketError, BracketMatch, BracketOutcome};
use crate::records::{PartitionKey, RatioRecord};
use crate::standards::{ReferenceStandard, StandardTable, StandardsError};

#[cfg(test)]
mod tests;

/// Errors raised while calibrating delta values
#[derive(Debug, thiserror::Error)]
pub enum DeltaError {
    /// Bracket matching failed
    #[error("Bracket matching failed: {0}")]
    BracketError(#[from] BracketError),

    /// The standards table cannot calibrate this isotopocule
    #[error("Configuration error: {0}")]
    StandardsError(#[from] StandardsError),

    /// A ratio entering the calibration is zero, negative or not finite
    #[error("Injection {injection} ({isotopocule}): {field} must be positive, got {value}")]
    NonPositiveRatio {
        /// Injection of the sample being calibrated
        injection: u32,
        /// Isotopocule of the sample being calibrated
        isotopocule: String,
        /// Which ratio was rejected
        field: &'static str,
        /// The rejected value
        value: f64,
    },
}

/// Bracketing reference value: the mean of the two neighbouring references.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketAverage {
    /// Arithmetic mean of the two reference ratios
    pub ratio: f64,
    /// Propagated standard error of the mean
    pub ratio_sem: f64,
}

impl BracketAverage {
    /// Average two reference measurements
    pub fn new(before_ratio: f64, before_sem: f64, after_ratio: f64, after_sem: f64) -> Self {
        Self {
            ratio: (before_ratio + after_ratio) / 2.0,
            ratio_sem: 0.5 * (before_sem.powi(2) + after_sem.powi(2)).sqrt(),
        }
    }
}

/// Calibrated delta value and its uncertainty, per mille.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibrated {
    /// Delta value on the international scale
    pub delta: f64,
    /// Propagated standard error of `delta`
    pub delta_sem: f64,
}

/// Calibrate a sample ratio against a bracketing reference value.
///
/// Both `ratio` and `reference.ratio` must be finite and strictly positive;
/// `injection` and `isotopocule` only label the error.
pub fn calibrate(
    injection: u32,
    isotopocule: &str,
    ratio: f64,
    ratio_sem: f64,
    reference: BracketAverage,
    standard: &ReferenceStandard,
) -> Result<Calibrated, DeltaError> {
    let check = |field: &'static str, value: f64| {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(DeltaError::NonPositiveRatio {
                injection,
                isotopocule: isotopocule.to_string(),
                field,
                value,
            })
        }
    };
    check("ratio", ratio)?;
    check("ref_ratio", reference.ratio)?;

    let delta = (ratio / reference.ratio) * standard.multiplier() - 1000.0;
    let relative = ((ratio_sem / ratio).powi(2)
        + (reference.ratio_sem / reference.ratio).powi(2))
    .sqrt();
    let delta_sem = (delta + 1000.0) * relative;

    Ok(Calibrated { delta, delta_sem })
}

/// One calibrated sample measurement with its bracketing references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketedDelta {
    /// Sample injection
    pub injection: u32,
    /// Isotopocule label
    pub isotopocule: String,
    /// Sample name
    pub sample: Option<String>,
    /// Experimental condition label
    pub condition: Option<String>,
    /// Basepeak identity
    pub basepeak: Option<String>,
    /// Sample ratio
    pub ratio: f64,
    /// Sample ratio SEM
    pub ratio_sem: f64,
    /// Injection of the preceding reference
    pub ref_before_injection: u32,
    /// Ratio of the preceding reference
    pub ref_before_ratio: f64,
    /// SEM of the preceding reference
    pub ref_before_ratio_sem: f64,
    /// Injection of the following reference
    pub ref_after_injection: u32,
    /// Ratio of the following reference
    pub ref_after_ratio: f64,
    /// SEM of the following reference
    pub ref_after_ratio_sem: f64,
    /// Bracketing reference ratio
    pub ref_ratio: f64,
    /// Bracketing reference SEM
    pub ref_ratio_sem: f64,
    /// Calibrated delta value, per mille
    pub delta: f64,
    /// Standard error of `delta`, per mille
    pub delta_sem: f64,
}

impl BracketedDelta {
    /// Calibrate one bracket match against its standard
    pub fn from_match(
        bracket: &BracketMatch<'_>,
        standard: &ReferenceStandard,
    ) -> Result<Self, DeltaError> {
        let BracketMatch {
            sample,
            before,
            after,
        } = *bracket;

        let reference =
            BracketAverage::new(before.ratio, before.ratio_sem, after.ratio, after.ratio_sem);
        let calibrated = calibrate(
            sample.injection,
            &sample.isotopocule,
            sample.ratio,
            sample.ratio_sem,
            reference,
            standard,
        )?;

        Ok(Self {
            injection: sample.injection,
            isotopocule: sample.isotopocule.clone(),
            sample: sample.sample.clone(),
            condition: sample.condition.clone(),
            basepeak: sample.basepeak.clone(),
            ratio: sample.ratio,
            ratio_sem: sample.ratio_sem,
            ref_before_injection: before.injection,
            ref_before_ratio: before.ratio,
            ref_before_ratio_sem: before.ratio_sem,
            ref_after_injection: after.injection,
            ref_after_ratio: after.ratio,
            ref_after_ratio_sem: after.ratio_sem,
            ref_ratio: reference.ratio,
            ref_ratio_sem: reference.ratio_sem,
            delta: calibrated.delta,
            delta_sem: calibrated.delta_sem,
        })
    }

    /// The bracketing partition of the sample
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey {
            isotopocule: self.isotopocule.clone(),
            condition: self.condition.clone(),
            basepeak: self.basepeak.clone(),
        }
    }
}

/// Calibrate every bracketed sample of a matching outcome.
///
/// Fails on the first sample whose isotopocule has no standard or whose
/// ratios are not positive.
pub fn calculate_deltas(
    outcome: &BracketOutcome<'_>,
    standards: &StandardTable,
) -> Result<Vec<BracketedDelta>, DeltaError> {
    outcome
        .matches
        .iter()
        .map(|bracket| {
            let standard = standards.require(&bracket.sample.isotopocule)?;
            BracketedDelta::from_match(bracket, standard)
        })
        .collect()
}

/// Match brackets and calibrate in one step
pub fn bracketed_deltas<'a, I>(
    records: I,
    standards: &StandardTable,
) -> Result<Vec<BracketedDelta>, DeltaError>
where
    I: IntoIterator<Item = &'a RatioRecord>,
    I::IntoIter: Clone,
{
    let outcome = match_brackets(records)?;
    calculate_deltas(&outcome, standards)
}
