//! # isodelta - Bracketed Isotope Delta Calibration
//!
//! `isodelta` turns per-injection isotopocule ratios measured on an
//! Orbitrap into calibrated delta values (per mille) by bracketing every
//! sample injection between two reference-standard injections.
//!
//! ## Key Features
//!
//! - **Exact-adjacency bracketing**: a sample at injection `i` is calibrated
//!   only against the references at `i - 1` and `i + 1` of the same series.
//!   Unbracketed samples are excluded, never extrapolated.
//!
//! - **Propagated uncertainty**: sample and reference standard errors are
//!   combined in quadrature into the delta standard error.
//!
//! - **Typed partitions**: independent series sharing one table are kept
//!   apart by an explicit [`records::PartitionKey`].
//!
//! - **One unit convention**: certified `delta_known` values are per mille
//!   and range-checked when the standards table is loaded.
//!
//! ## Quick Start
//!
//! ```rust
//! use isodelta::records::{RatioRecord, RatioTable};
//! use isodelta::standards::{ReferenceStandard, StandardTable};
//!
//! let table = RatioTable::new(vec![
//!     RatioRecord::reference(2, "18O", 0.00602, 0.00002),
//!     RatioRecord::sample(3, "18O", 0.00650, 0.00003).with_sample("NO3-A"),
//!     RatioRecord::reference(4, "18O", 0.00602, 0.00002),
//! ])?;
//! let standards = StandardTable::new(vec![ReferenceStandard::new("18O", 57.5)])?;
//!
//! let output = isodelta::pipeline::run(&table, &standards)?;
//! assert_eq!(output.deltas.len(), 1);
//! assert!((output.deltas[0].delta - 141.82).abs() < 0.01);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`records`]: per-injection ratio records and the validated ratio table
//! - [`standards`]: reference-standard constants and unit validation
//! - [`bracket`]: exact-adjacency bracket matching
//! - [`delta`]: delta calibration and uncertainty propagation
//! - [`aggregate`]: replicate summary statistics
//! - [`scans`]: per-scan to per-injection summarization
//! - [`pipeline`]: the stages chained together
//! - [`validator`]: pre-flight input checks
//! - [`export`]: CSV and JSON output

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod aggregate;
pub mod bracket;
pub mod delta;
pub mod export;
pub mod pipeline;
pub mod records;
pub mod scans;
pub mod standards;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::aggregate::{summarize_replicates, ReplicateSummary};
    pub use crate::bracket::{match_brackets, BracketError, BracketMatch, BracketOutcome};
    pub use crate::delta::{bracketed_deltas, calculate_deltas, BracketedDelta, DeltaError};
    pub use crate::export::{write_csv, write_csv_file, ExportError, RunReport};
    pub use crate::pipeline::{PipelineOutput, PipelineStats};
    pub use crate::records::{PartitionKey, RatioRecord, RatioTable, Role, TableError};
    pub use crate::scans::{summarize_scans, ScanError, ScanRecord, Sequence, SummarizeOptions};
    pub use crate::standards::{DeltaUnits, ReferenceStandard, StandardTable, StandardsError};
    pub use crate::validator::{validate_inputs, Finding, ValidationReport, ValidationStep};
}
