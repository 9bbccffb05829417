use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{deserialize_flag, PartitionKey, RatioRecord, Role, TableError};

/// Row layout accepted from CSV/TSV input.
///
/// Either `role` or `is_reference` must be present; both are accepted so
/// tables exported with a boolean flag load without rewriting.
#[derive(Debug, Deserialize)]
struct RatioRow {
    injection: u32,
    isotopocule: String,
    role: Option<Role>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    is_reference: Option<bool>,
    ratio: f64,
    ratio_sem: f64,
    sample: Option<String>,
    condition: Option<String>,
    basepeak: Option<String>,
}

impl RatioRow {
    fn into_record(self, row: usize) -> Result<RatioRecord, TableError> {
        let role = match (self.role, self.is_reference) {
            (Some(role), None) => role,
            (None, Some(flag)) => Role::from_is_reference(flag),
            (Some(role), Some(flag)) => {
                if role != Role::from_is_reference(flag) {
                    return Err(TableError::ConflictingRole { row });
                }
                role
            }
            (None, None) => return Err(TableError::MissingRole { row }),
        };

        Ok(RatioRecord {
            injection: self.injection,
            isotopocule: self.isotopocule,
            role,
            ratio: self.ratio,
            ratio_sem: self.ratio_sem,
            sample: self.sample,
            condition: self.condition,
            basepeak: self.basepeak,
        })
    }
}

/// Validated, immutable table of per-injection ratio summaries.
///
/// Construction guarantees finite positive ratios, finite non-negative
/// standard errors, non-empty isotopocule labels and unique injection
/// numbers within each partition.
#[derive(Debug, Clone, Default)]
pub struct RatioTable {
    records: Vec<RatioRecord>,
}

impl RatioTable {
    /// Validate records and build a table, preserving input order
    pub fn new(records: Vec<RatioRecord>) -> Result<Self, TableError> {
        let mut seen: HashSet<(PartitionKey, u32)> = HashSet::with_capacity(records.len());

        for record in &records {
            validate_record(record)?;

            let key = (record.partition_key(), record.injection);
            if !seen.insert(key) {
                return Err(TableError::DuplicateInjection {
                    partition: record.partition_key(),
                    injection: record.injection,
                });
            }
        }

        log::debug!("Built ratio table with {} records", records.len());
        Ok(Self { records })
    }

    /// Parse a ratio table from a file; `.tsv` files are read tab-delimited
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        let delimiter = delimiter_for(path);
        let file = File::open(path)?;
        Self::from_reader_with_delimiter(BufReader::new(file), delimiter)
    }

    /// Parse a comma-separated ratio table from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        Self::from_reader_with_delimiter(reader, b',')
    }

    /// Parse a ratio table from a reader with an explicit delimiter
    pub fn from_reader_with_delimiter<R: Read>(
        reader: R,
        delimiter: u8,
    ) -> Result<Self, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (i, row) in csv_reader.deserialize::<RatioRow>().enumerate() {
            records.push(row?.into_record(i + 1)?);
        }

        Self::new(records)
    }

    /// All records in input order
    pub fn records(&self) -> &[RatioRecord] {
        &self.records
    }

    /// Iterate over the records
    pub fn iter(&self) -> std::slice::Iter<'_, RatioRecord> {
        self.records.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct isotopocule labels, sorted
    pub fn isotopocules(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.isotopocule.as_str()).collect()
    }

    /// Distinct partitions, sorted
    pub fn partitions(&self) -> BTreeSet<PartitionKey> {
        self.records.iter().map(RatioRecord::partition_key).collect()
    }

    /// Number of sample (non-reference) records
    pub fn sample_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_reference()).count()
    }

    /// Consume the table and return its records
    pub fn into_records(self) -> Vec<RatioRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a RatioTable {
    type Item = &'a RatioRecord;
    type IntoIter = std::slice::Iter<'a, RatioRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn validate_record(record: &RatioRecord) -> Result<(), TableError> {
    if record.isotopocule.trim().is_empty() {
        return Err(TableError::EmptyIsotopocule {
            injection: record.injection,
        });
    }

    let invalid = |field: &'static str, value: f64| TableError::InvalidValue {
        injection: record.injection,
        isotopocule: record.isotopocule.clone(),
        field,
        value,
    };

    if !record.ratio.is_finite() || record.ratio <= 0.0 {
        return Err(invalid("ratio", record.ratio));
    }
    if !record.ratio_sem.is_finite() || record.ratio_sem < 0.0 {
        return Err(invalid("ratio_sem", record.ratio_sem));
    }

    Ok(())
}

pub(crate) fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("txt") => b'\t',
        _ => b',',
    }
}
