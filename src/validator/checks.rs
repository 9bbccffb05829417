use std::collections::{BTreeMap, BTreeSet};

use crate::bracket::{match_brackets, BracketError};
use crate::records::{PartitionKey, RatioRecord, RatioTable};
use crate::standards::StandardTable;

use super::{Finding, UnbracketedSample, ValidationReport};

/// Every calibrated isotopocule has a plausible standard
pub(crate) fn check_standards(
    table: &RatioTable,
    standards: &StandardTable,
    report: &mut ValidationReport,
) {
    let calibrated: BTreeSet<&str> = table
        .iter()
        .filter(|r| !r.is_reference())
        .map(|r| r.isotopocule.as_str())
        .collect();

    for isotopocule in calibrated {
        let isotopocule_owned = isotopocule.to_string();
        report.push(match standards.get(isotopocule) {
            None => Finding::MissingStandard {
                isotopocule: isotopocule_owned,
            },
            Some(standard) if standard.is_suspiciously_small() => Finding::SuspiciousStandard {
                isotopocule: isotopocule_owned,
                delta_known: standard.delta_known,
            },
            Some(standard) => Finding::StandardOk {
                isotopocule: isotopocule_owned,
                delta_known: standard.delta_known,
            },
        });
    }
}

/// Every series with samples also holds references
pub(crate) fn check_partitions(table: &RatioTable, report: &mut ValidationReport) {
    // (references, samples) per partition
    let mut counts: BTreeMap<PartitionKey, (usize, usize)> = BTreeMap::new();
    for record in table {
        let entry = counts.entry(record.partition_key()).or_default();
        if record.is_reference() {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    for (partition, (references, samples)) in counts {
        report.push(if samples > 0 && references == 0 {
            Finding::SeriesWithoutReferences { partition, samples }
        } else {
            Finding::SeriesOk {
                partition,
                references,
                samples,
            }
        });
    }
}

/// Bracket matching succeeds and covers the samples
pub(crate) fn check_brackets<'a, I>(records: I, report: &mut ValidationReport)
where
    I: IntoIterator<Item = &'a RatioRecord>,
    I::IntoIter: Clone,
{
    let outcome = match match_brackets(records) {
        Ok(outcome) => outcome,
        Err(BracketError::AmbiguousMatch {
            partition,
            injection,
            candidates,
        }) => {
            report.push(Finding::AmbiguousBracket {
                partition,
                injection,
                candidates,
            });
            return;
        }
    };

    if outcome.unbracketed.is_empty() {
        report.push(Finding::AllBracketed {
            samples: outcome.matches.len(),
        });
        return;
    }

    let samples = outcome
        .unbracketed
        .iter()
        .map(|u| UnbracketedSample {
            injection: u.sample.injection,
            partition: u.sample.partition_key(),
            missing: u.missing,
        })
        .collect();

    report.push(Finding::Unbracketed {
        samples,
        total: outcome.sample_count(),
    });
}
