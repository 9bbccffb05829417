//! # Bracket Matcher
//!
//! Pairs every sample injection with the reference injections immediately
//! before and after it in acquisition order.
//!
//! Matching is exact adjacency by injection number within one
//! [`PartitionKey`]: a sample at injection `i` is bracketed only by the
//! references at `i - 1` and `i + 1`. A sample missing either neighbour is
//! left unbracketed and produces no delta. Neighbours are never
//! extrapolated or searched for further away.
//!
//! The lookup is a fan-out join: every (before, after) candidate pair is
//! collected and more than one candidate is a data-quality error.

use std::collections::HashMap;
use std::fmt;

use crate::records::{PartitionKey, RatioRecord};

/// Errors raised while matching brackets
#[derive(Debug, thiserror::Error)]
pub enum BracketError {
    /// More than one reference pairing exists for a sample
    #[error(
        "Ambiguous bracket for sample injection {injection} in partition {partition}: \
         {candidates} candidate reference pairs (duplicate injection numbers?)"
    )]
    AmbiguousMatch {
        /// Partition of the sample
        partition: PartitionKey,
        /// Injection of the sample
        injection: u32,
        /// Number of (before, after) combinations found
        candidates: usize,
    },
}

/// A sample record together with its two bracketing references.
#[derive(Debug, Clone, Copy)]
pub struct BracketMatch<'a> {
    /// The sample record at injection `i`
    pub sample: &'a RatioRecord,
    /// The reference record at injection `i - 1`
    pub before: &'a RatioRecord,
    /// The reference record at injection `i + 1`
    pub after: &'a RatioRecord,
}

/// Which neighbour was missing for an unbracketed sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingNeighbour {
    /// No reference at `i - 1`
    Before,
    /// No reference at `i + 1`
    After,
    /// No reference on either side
    Both,
}

impl fmt::Display for MissingNeighbour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingNeighbour::Before => write!(f, "no preceding reference"),
            MissingNeighbour::After => write!(f, "no following reference"),
            MissingNeighbour::Both => write!(f, "no adjacent references"),
        }
    }
}

/// A sample excluded from calibration.
#[derive(Debug, Clone, Copy)]
pub struct Unbracketed<'a> {
    /// The excluded sample record
    pub sample: &'a RatioRecord,
    /// Which neighbour was missing
    pub missing: MissingNeighbour,
}

/// Result of matching a set of records.
#[derive(Debug, Clone, Default)]
pub struct BracketOutcome<'a> {
    /// Bracketed samples, in input order
    pub matches: Vec<BracketMatch<'a>>,
    /// Samples without both exact neighbours, in input order
    pub unbracketed: Vec<Unbracketed<'a>>,
}

impl BracketOutcome<'_> {
    /// Total number of sample records examined
    pub fn sample_count(&self) -> usize {
        self.matches.len() + self.unbracketed.len()
    }
}

type ReferenceIndex<'a> = HashMap<(PartitionKey, u32), Vec<&'a RatioRecord>>;

fn index_references<'a, I>(records: I) -> ReferenceIndex<'a>
where
    I: IntoIterator<Item = &'a RatioRecord>,
{
    let mut index: ReferenceIndex<'a> = HashMap::new();
    for record in records.into_iter().filter(|r| r.is_reference()) {
        index
            .entry((record.partition_key(), record.injection))
            .or_default()
            .push(record);
    }
    index
}

fn neighbours<'i, 'a>(
    index: &'i ReferenceIndex<'a>,
    partition: &PartitionKey,
    injection: Option<u32>,
) -> &'i [&'a RatioRecord] {
    injection
        .and_then(|i| index.get(&(partition.clone(), i)))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Match every sample record to its exactly adjacent references.
///
/// Records may come from any source; duplicate references at the same
/// injection within one partition surface as [`BracketError::AmbiguousMatch`]
/// when a sample depends on them.
pub fn match_brackets<'a, I>(records: I) -> Result<BracketOutcome<'a>, BracketError>
where
    I: IntoIterator<Item = &'a RatioRecord>,
    I::IntoIter: Clone,
{
    let records = records.into_iter();
    let index = index_references(records.clone());
    let mut outcome = BracketOutcome::default();

    for sample in records.filter(|r| !r.is_reference()) {
        let partition = sample.partition_key();

        let befores = neighbours(&index, &partition, sample.injection.checked_sub(1));
        let afters = neighbours(&index, &partition, sample.injection.checked_add(1));

        let missing = match (befores.is_empty(), afters.is_empty()) {
            (false, false) => None,
            (true, false) => Some(MissingNeighbour::Before),
            (false, true) => Some(MissingNeighbour::After),
            (true, true) => Some(MissingNeighbour::Both),
        };

        if let Some(missing) = missing {
            log::debug!(
                "Injection {} ({}) left unbracketed: {}",
                sample.injection,
                partition,
                missing
            );
            outcome.unbracketed.push(Unbracketed { sample, missing });
            continue;
        }

        let mut candidates = befores
            .iter()
            .flat_map(|before| afters.iter().map(move |after| (*before, *after)));

        let first = candidates.next();
        let remaining = candidates.count();

        match (first, remaining) {
            (Some((before, after)), 0) => {
                outcome.matches.push(BracketMatch {
                    sample,
                    before,
                    after,
                });
            }
            _ => {
                return Err(BracketError::AmbiguousMatch {
                    partition,
                    injection: sample.injection,
                    candidates: befores.len() * afters.len(),
                });
            }
        }
    }

    log::debug!(
        "Matched {} of {} samples to bracketing references",
        outcome.matches.len(),
        outcome.sample_count()
    );

    Ok(outcome)
}
