//! # Input Validation
//!
//! Pre-flight checks run before calibrating a ratio table. Problems that
//! would abort the pipeline are reported as failures; conditions that only
//! shrink the output (unbracketed samples, suspicious constants) are
//! reported as warnings.
//!
//! ## Validation Checklist
//!
//! 1. **Standards**: every isotopocule with sample records has a reference
//!    standard, and no `delta_known` looks like a fraction
//! 2. **Partitions**: every series holds both references and samples
//! 3. **Brackets**: matching succeeds and reports unbracketed samples
//!
//! Each check records a [`Finding`] tagged with its [`ValidationStep`].
//! Findings keep their data structured, so callers can act on
//! [`ValidationReport::unbracketed`] or
//! [`ValidationReport::missing_standards`] without parsing text.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use isodelta::records::RatioTable;
//! use isodelta::standards::StandardTable;
//! use isodelta::validator::validate_inputs;
//!
//! let table = RatioTable::from_path("ratios.csv")?;
//! let standards = StandardTable::from_file("standards.toml")?;
//! let report = validate_inputs("ratios.csv", &table, &standards);
//! println!("{}", report);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod checks;
mod report;

pub use report::{Finding, Severity, UnbracketedSample, ValidationReport, ValidationStep};

use crate::records::RatioTable;
use crate::standards::StandardTable;

/// Run all checks on a ratio table and its standards
pub fn validate_inputs(
    source: impl Into<String>,
    table: &RatioTable,
    standards: &StandardTable,
) -> ValidationReport {
    let mut report = ValidationReport::new(source);

    report.push(Finding::TableLoaded {
        records: table.len(),
        partitions: table.partitions().len(),
    });

    checks::check_standards(table, standards, &mut report);
    checks::check_partitions(table, &mut report);
    checks::check_brackets(table, &mut report);

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::MissingNeighbour;
    use crate::records::{PartitionKey, RatioRecord};
    use crate::standards::ReferenceStandard;

    fn table(records: Vec<RatioRecord>) -> RatioTable {
        RatioTable::new(records).unwrap()
    }

    fn standards(delta_known: f64) -> StandardTable {
        StandardTable::new(vec![ReferenceStandard::new("18O", delta_known)]).unwrap()
    }

    #[test]
    fn test_clean_inputs_pass() {
        let table = table(vec![
            RatioRecord::reference(1, "18O", 0.006, 0.0),
            RatioRecord::sample(2, "18O", 0.0065, 0.0),
            RatioRecord::reference(3, "18O", 0.006, 0.0),
        ]);

        let report = validate_inputs("test", &table, &standards(57.5));
        assert!(!report.has_failures(), "{}", report);
        assert!(!report.has_warnings(), "{}", report);
        assert!(report.unbracketed().is_empty());
        assert_eq!(report.count(Severity::Ok), 4);
        assert!(report.to_string().ends_with("Validation PASSED\n"));
    }

    #[test]
    fn test_findings_grouped_by_step() {
        let table = table(vec![
            RatioRecord::reference(1, "18O", 0.006, 0.0),
            RatioRecord::sample(2, "18O", 0.0065, 0.0),
            RatioRecord::reference(3, "18O", 0.006, 0.0),
            RatioRecord::sample(2, "18O", 0.0065, 0.0).with_condition("tuned"),
        ]);

        let report = validate_inputs("test", &table, &standards(57.5));
        assert_eq!(report.findings_in(ValidationStep::Table).count(), 1);
        assert_eq!(report.findings_in(ValidationStep::Standards).count(), 1);
        assert_eq!(report.findings_in(ValidationStep::Partitions).count(), 2);
        assert_eq!(report.findings_in(ValidationStep::Brackets).count(), 1);

        let steps: Vec<ValidationStep> = report.findings().iter().map(Finding::step).collect();
        let mut sorted = steps.clone();
        sorted.sort();
        assert_eq!(steps, sorted);
    }

    #[test]
    fn test_missing_standard_fails() {
        let table = table(vec![
            RatioRecord::reference(1, "15N", 0.0037, 0.0),
            RatioRecord::sample(2, "15N", 0.0038, 0.0),
            RatioRecord::reference(3, "15N", 0.0037, 0.0),
        ]);

        let report = validate_inputs("test", &table, &standards(57.5));
        assert!(report.has_failures());
        assert_eq!(report.count(Severity::Failed), 1);
        assert_eq!(report.missing_standards().collect::<Vec<_>>(), vec!["15N"]);
    }

    #[test]
    fn test_unbracketed_samples_are_structured() {
        let table = table(vec![
            RatioRecord::sample(1, "18O", 0.0065, 0.0),
            RatioRecord::reference(2, "18O", 0.006, 0.0),
            RatioRecord::sample(3, "18O", 0.0065, 0.0),
            RatioRecord::reference(4, "18O", 0.006, 0.0),
            RatioRecord::sample(5, "18O", 0.0065, 0.0).with_basepeak("NO3-"),
        ]);

        let report = validate_inputs("test", &table, &standards(57.5));
        assert!(!report.has_failures(), "{}", report);

        let unbracketed = report.unbracketed();
        assert_eq!(unbracketed.len(), 2);
        assert_eq!(unbracketed[0].injection, 1);
        assert_eq!(unbracketed[0].partition, PartitionKey::new("18O"));
        assert_eq!(unbracketed[0].missing, MissingNeighbour::Before);
        assert_eq!(unbracketed[1].injection, 5);
        assert_eq!(unbracketed[1].partition.basepeak.as_deref(), Some("NO3-"));
        assert_eq!(unbracketed[1].missing, MissingNeighbour::Both);

        assert!(report.findings().iter().any(|f| matches!(
            f,
            Finding::Unbracketed { samples, total: 3 } if samples.len() == 2
        )));
    }

    #[test]
    fn test_suspicious_standard_warns() {
        let table = table(vec![
            RatioRecord::reference(1, "18O", 0.006, 0.0),
            RatioRecord::sample(2, "18O", 0.0065, 0.0),
            RatioRecord::reference(3, "18O", 0.006, 0.0),
        ]);

        let report = validate_inputs("test", &table, &standards(0.0575));
        assert!(!report.has_failures(), "{}", report);
        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(
            report.findings_in(ValidationStep::Standards).next(),
            Some(&Finding::SuspiciousStandard {
                isotopocule: "18O".to_string(),
                delta_known: 0.0575,
            })
        );
    }

    #[test]
    fn test_series_without_references_warns() {
        let table = table(vec![
            RatioRecord::sample(1, "18O", 0.0065, 0.0).with_condition("orphan"),
            RatioRecord::reference(1, "18O", 0.006, 0.0),
        ]);

        let report = validate_inputs("test", &table, &standards(57.5));
        let orphan = report
            .findings_in(ValidationStep::Partitions)
            .find_map(|f| match f {
                Finding::SeriesWithoutReferences { partition, samples } => {
                    Some((partition.clone(), *samples))
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(orphan.0.condition.as_deref(), Some("orphan"));
        assert_eq!(orphan.1, 1);
    }

    #[test]
    fn test_ambiguous_bracket_fails() {
        let references = [
            RatioRecord::reference(1, "18O", 0.006, 0.0),
            RatioRecord::reference(1, "18O", 0.0061, 0.0),
            RatioRecord::reference(3, "18O", 0.006, 0.0),
        ];
        let sample = RatioRecord::sample(2, "18O", 0.0065, 0.0);
        let mut report = ValidationReport::new("test");
        let records: Vec<RatioRecord> = references.iter().cloned().chain([sample]).collect();

        // RatioTable rejects duplicates up front
        checks::check_brackets(&records, &mut report);
        assert!(report.has_failures());
        assert!(matches!(
            report.findings()[0],
            Finding::AmbiguousBracket { injection: 2, candidates: 2, .. }
        ));
    }
}
