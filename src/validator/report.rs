use std::fmt::{self, Write};

use crate::bracket::MissingNeighbour;
use crate::records::PartitionKey;

/// Unbracketed injections spelled out in the rendered report
const MAX_LISTED_INJECTIONS: usize = 10;

/// The stage of input validation a finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationStep {
    /// Ratio table shape
    Table,
    /// Reference standard coverage and plausibility
    Standards,
    /// Reference and sample presence per series
    Partitions,
    /// Exact-adjacency bracket matching
    Brackets,
}

impl ValidationStep {
    /// All steps in the order they run
    pub const ALL: [ValidationStep; 4] = [
        ValidationStep::Table,
        ValidationStep::Standards,
        ValidationStep::Partitions,
        ValidationStep::Brackets,
    ];

    fn title(self) -> &'static str {
        match self {
            ValidationStep::Table => "Ratio table",
            ValidationStep::Standards => "Reference standards",
            ValidationStep::Partitions => "Series",
            ValidationStep::Brackets => "Brackets",
        }
    }
}

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing to act on
    Ok,
    /// Calibration runs but produces less output than expected
    Warning,
    /// Calibration would abort
    Failed,
}

/// A sample the bracket step will exclude
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbracketedSample {
    /// Injection number of the sample
    pub injection: u32,
    /// Series the sample belongs to
    pub partition: PartitionKey,
    /// Which adjacent reference is absent
    pub missing: MissingNeighbour,
}

/// One observation made while validating inputs
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// The ratio table loaded
    TableLoaded {
        /// Number of records
        records: usize,
        /// Number of distinct partition keys
        partitions: usize,
    },
    /// A standard exists for an isotopocule that has samples
    StandardOk {
        /// Isotopocule label
        isotopocule: String,
        /// Known delta in per mille
        delta_known: f64,
    },
    /// Samples exist for an isotopocule without a standard
    MissingStandard {
        /// Isotopocule label
        isotopocule: String,
    },
    /// The standard's known delta looks like a fraction
    SuspiciousStandard {
        /// Isotopocule label
        isotopocule: String,
        /// Known delta as configured
        delta_known: f64,
    },
    /// A series holds references next to its samples
    SeriesOk {
        /// Series key
        partition: PartitionKey,
        /// Reference injections in the series
        references: usize,
        /// Sample injections in the series
        samples: usize,
    },
    /// A series has samples but nothing to calibrate them against
    SeriesWithoutReferences {
        /// Series key
        partition: PartitionKey,
        /// Sample injections in the series
        samples: usize,
    },
    /// Every sample has both adjacent references
    AllBracketed {
        /// Number of bracketed samples
        samples: usize,
    },
    /// Some samples lack an adjacent reference
    Unbracketed {
        /// Excluded samples in match order
        samples: Vec<UnbracketedSample>,
        /// Samples considered in total
        total: usize,
    },
    /// More than one reference pair brackets a sample
    AmbiguousBracket {
        /// Series key
        partition: PartitionKey,
        /// Injection of the sample
        injection: u32,
        /// Number of candidate reference pairs
        candidates: usize,
    },
}

impl Finding {
    /// Step that produced this finding
    pub fn step(&self) -> ValidationStep {
        match self {
            Finding::TableLoaded { .. } => ValidationStep::Table,
            Finding::StandardOk { .. }
            | Finding::MissingStandard { .. }
            | Finding::SuspiciousStandard { .. } => ValidationStep::Standards,
            Finding::SeriesOk { .. } | Finding::SeriesWithoutReferences { .. } => {
                ValidationStep::Partitions
            }
            Finding::AllBracketed { .. }
            | Finding::Unbracketed { .. }
            | Finding::AmbiguousBracket { .. } => ValidationStep::Brackets,
        }
    }

    /// Severity of this finding
    pub fn severity(&self) -> Severity {
        match self {
            Finding::TableLoaded { .. }
            | Finding::StandardOk { .. }
            | Finding::SeriesOk { .. }
            | Finding::AllBracketed { .. } => Severity::Ok,
            Finding::SuspiciousStandard { .. }
            | Finding::SeriesWithoutReferences { .. }
            | Finding::Unbracketed { .. } => Severity::Warning,
            Finding::MissingStandard { .. } | Finding::AmbiguousBracket { .. } => {
                Severity::Failed
            }
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::TableLoaded {
                records,
                partitions,
            } => write!(f, "{} records in {} partitions", records, partitions),
            Finding::StandardOk {
                isotopocule,
                delta_known,
            } => write!(f, "{}: delta_known = {} permil", isotopocule, delta_known),
            Finding::MissingStandard { isotopocule } => {
                write!(f, "{}: no delta_known configured", isotopocule)
            }
            Finding::SuspiciousStandard {
                isotopocule,
                delta_known,
            } => write!(
                f,
                "{}: delta_known = {} permil looks like a fractional value",
                isotopocule, delta_known
            ),
            Finding::SeriesOk {
                partition,
                references,
                samples,
            } => write!(
                f,
                "{}: {} references, {} samples",
                partition, references, samples
            ),
            Finding::SeriesWithoutReferences { partition, samples } => write!(
                f,
                "{}: {} samples but no reference injections",
                partition, samples
            ),
            Finding::AllBracketed { samples } => {
                write!(f, "all {} samples bracketed", samples)
            }
            Finding::Unbracketed { samples, total } => {
                write!(
                    f,
                    "{} of {} samples unbracketed and excluded:",
                    samples.len(),
                    total
                )?;
                for (i, sample) in samples.iter().take(MAX_LISTED_INJECTIONS).enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(
                        f,
                        "{}{} ({}, {})",
                        sep, sample.injection, sample.partition, sample.missing
                    )?;
                }
                if samples.len() > MAX_LISTED_INJECTIONS {
                    write!(f, ", ...")?;
                }
                Ok(())
            }
            Finding::AmbiguousBracket {
                partition,
                injection,
                candidates,
            } => write!(
                f,
                "sample {} in {}: {} candidate reference pairs",
                injection, partition, candidates
            ),
        }
    }
}

/// Pre-flight report on a ratio table and its standards
#[derive(Debug)]
pub struct ValidationReport {
    /// Label of the validated input (usually the ratio file path)
    pub source: String,
    findings: Vec<Finding>,
}

impl ValidationReport {
    /// Create an empty report for the given input label
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            findings: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// All findings in the order they were made
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings produced by one step
    pub fn findings_in(&self, step: ValidationStep) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.step() == step)
    }

    /// Number of findings with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity() == severity)
            .count()
    }

    /// Whether calibration would abort on these inputs
    pub fn has_failures(&self) -> bool {
        self.count(Severity::Failed) > 0
    }

    /// Whether calibration would run with reduced output
    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Warning) > 0
    }

    /// Samples the bracket step excludes, empty when all are bracketed
    pub fn unbracketed(&self) -> &[UnbracketedSample] {
        self.findings
            .iter()
            .find_map(|f| match f {
                Finding::Unbracketed { samples, .. } => Some(samples.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Isotopocules that have samples but no reference standard
    pub fn missing_standards(&self) -> impl Iterator<Item = &str> {
        self.findings.iter().filter_map(|f| match f {
            Finding::MissingStandard { isotopocule } => Some(isotopocule.as_str()),
            _ => None,
        })
    }

    fn verdict(&self) -> &'static str {
        if self.has_failures() {
            "Validation FAILED"
        } else if self.has_warnings() {
            "Validation PASSED with warnings"
        } else {
            "Validation PASSED"
        }
    }

    fn overall(&self) -> Severity {
        if self.has_failures() {
            Severity::Failed
        } else if self.has_warnings() {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }

    fn render<W: Write>(&self, out: &mut W, paint: &dyn Paint) -> fmt::Result {
        writeln!(out, "{}", paint.heading("isodelta Validation Report"))?;
        writeln!(out, "{}", paint.heading("=========================="))?;
        writeln!(out, "Input: {}", self.source)?;

        for step in ValidationStep::ALL {
            let mut findings = self.findings_in(step).peekable();
            if findings.peek().is_none() {
                continue;
            }
            writeln!(out)?;
            writeln!(out, "{}", paint.heading(step.title()))?;
            for finding in findings {
                let severity = finding.severity();
                writeln!(
                    out,
                    "  [{}] {}",
                    paint.mark(severity),
                    paint.tint(severity, &finding.to_string())
                )?;
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "Summary: {} passed, {} warnings, {} failed",
            paint.tint(Severity::Ok, &self.count(Severity::Ok).to_string()),
            paint.tint(Severity::Warning, &self.count(Severity::Warning).to_string()),
            paint.tint(Severity::Failed, &self.count(Severity::Failed).to_string())
        )?;
        writeln!(out)?;
        writeln!(out, "{}", paint.tint(self.overall(), self.verdict()))
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        let mut output = String::new();

        #[cfg(feature = "colorized_output")]
        let written = self.render(&mut output, &Colored);
        #[cfg(not(feature = "colorized_output"))]
        let written = self.render(&mut output, &Plain);

        match written {
            Ok(()) => output,
            Err(_) => self.to_string(),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &Plain)
    }
}

/// Styling applied while rendering a report
trait Paint {
    fn heading(&self, text: &str) -> String;
    fn mark(&self, severity: Severity) -> String;
    fn tint(&self, severity: Severity, text: &str) -> String;
}

struct Plain;

impl Paint for Plain {
    fn heading(&self, text: &str) -> String {
        text.to_string()
    }

    fn mark(&self, severity: Severity) -> String {
        match severity {
            Severity::Ok => "✓",
            Severity::Warning => "⚠",
            Severity::Failed => "✗",
        }
        .to_string()
    }

    fn tint(&self, _severity: Severity, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(feature = "colorized_output")]
struct Colored;

#[cfg(feature = "colorized_output")]
impl Paint for Colored {
    fn heading(&self, text: &str) -> String {
        console::style(text).bold().cyan().to_string()
    }

    fn mark(&self, severity: Severity) -> String {
        use console::Emoji;

        let emoji = match severity {
            Severity::Ok => Emoji("✓", "OK"),
            Severity::Warning => Emoji("⚠", "WARN"),
            Severity::Failed => Emoji("✗", "FAIL"),
        };
        self.tint(severity, &emoji.to_string())
    }

    fn tint(&self, severity: Severity, text: &str) -> String {
        let styled = console::style(text);
        match severity {
            Severity::Ok => styled.green(),
            Severity::Warning => styled.yellow(),
            Severity::Failed => styled.red().bold(),
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbracketed(injection: u32) -> UnbracketedSample {
        UnbracketedSample {
            injection,
            partition: PartitionKey::new("18O"),
            missing: MissingNeighbour::After,
        }
    }

    #[test]
    fn test_render_groups_by_step() {
        let mut report = ValidationReport::new("ratios.csv");
        report.push(Finding::TableLoaded {
            records: 3,
            partitions: 1,
        });
        report.push(Finding::MissingStandard {
            isotopocule: "15N".to_string(),
        });

        let text = report.to_string();
        let table = text.find("Ratio table").unwrap();
        let standards = text.find("Reference standards").unwrap();
        assert!(table < standards);
        assert!(!text.contains("Brackets"));
        assert!(text.contains("  [✗] 15N: no delta_known configured"));
        assert!(text.ends_with("Validation FAILED\n"));
    }

    #[test]
    fn test_long_unbracketed_list_is_truncated() {
        let finding = Finding::Unbracketed {
            samples: (1..=12).map(unbracketed).collect(),
            total: 20,
        };

        let message = finding.to_string();
        assert!(message.starts_with("12 of 20 samples unbracketed and excluded: 1 (18O, no following reference)"));
        assert!(message.contains("10 (18O"));
        assert!(!message.contains("11 (18O"));
        assert!(message.ends_with(", ..."));
    }
}
