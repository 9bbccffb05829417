//! # Replicate Aggregator
//!
//! Collapses replicate [`BracketedDelta`] rows of the same sample into one
//! summary per sample and partition. Standard deviations use the sample
//! (`n - 1`) divisor and are `NaN` for a single replicate.
//!
//! Rows without a sample name have no replicate identity and are left out
//! of the summaries; they still appear in the per-injection delta table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::delta::BracketedDelta;
use crate::records::PartitionKey;
use crate::standards::StandardTable;

/// Summary statistics of replicate delta measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateSummary {
    /// Sample name
    pub sample: String,
    /// Isotopocule label
    pub isotopocule: String,
    /// Experimental condition label
    pub condition: Option<String>,
    /// Basepeak identity
    pub basepeak: Option<String>,
    /// Number of replicates
    pub n: usize,
    /// Mean raw ratio
    pub ratio_mean: f64,
    /// Relative standard deviation of the raw ratio (fraction)
    pub ratio_rsd: f64,
    /// Mean delta, per mille
    pub delta_mean: f64,
    /// Sample standard deviation of delta, per mille
    pub delta_sd: f64,
    /// Standard error of the mean delta, per mille
    pub delta_sem: f64,
    /// Ratio on the absolute scale implied by the mean delta
    pub ratio_corr: Option<f64>,
}

/// Arithmetic mean; `NaN` for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with the `n - 1` divisor; `NaN` when `n < 2`
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let avg = mean(values);
    let sum_sq = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Group deltas by sample and partition and summarize each group.
///
/// Groups are returned ordered by sample name, then partition key. Rows
/// with no sample name are skipped.
/// `ratio_corr` is filled when the isotopocule's standard carries a
/// `ratio_known`.
pub fn summarize_replicates(
    deltas: &[BracketedDelta],
    standards: &StandardTable,
) -> Vec<ReplicateSummary> {
    let mut grouped: BTreeMap<(String, PartitionKey), Vec<&BracketedDelta>> = BTreeMap::new();
    let mut unnamed = 0usize;

    for row in deltas {
        let Some(sample) = &row.sample else {
            unnamed += 1;
            continue;
        };
        grouped
            .entry((sample.clone(), row.partition_key()))
            .or_default()
            .push(row);
    }

    if unnamed > 0 {
        log::warn!(
            "{} calibrated injections have no sample name and are not summarized",
            unnamed
        );
    }

    grouped
        .into_iter()
        .map(|((sample, key), rows)| {
            let ratios: Vec<f64> = rows.iter().map(|r| r.ratio).collect();
            let values: Vec<f64> = rows.iter().map(|r| r.delta).collect();

            let n = rows.len();
            let ratio_mean = mean(&ratios);
            let delta_mean = mean(&values);
            let delta_sd = sample_std(&values);

            let ratio_corr = standards
                .get(&key.isotopocule)
                .and_then(|s| s.ratio_known)
                .map(|known| (delta_mean / 1000.0 + 1.0) * known);

            log::debug!(
                "Summarized {} replicates of {} ({}): delta = {:.3} ± {:.3}",
                n,
                sample,
                key,
                delta_mean,
                delta_sd
            );

            ReplicateSummary {
                sample,
                isotopocule: key.isotopocule,
                condition: key.condition,
                basepeak: key.basepeak,
                n,
                ratio_mean,
                ratio_rsd: sample_std(&ratios) / ratio_mean,
                delta_mean,
                delta_sd,
                delta_sem: delta_sd / (n as f64).sqrt(),
                ratio_corr,
            }
        })
        .collect()
}
