//! # Ratio Records
//!
//! Per-injection isotopocule ratio summaries, the only input of the
//! bracketing engine. Rows are tagged as reference or sample when they are
//! read and grouped into independent series by [`PartitionKey`].
//!
//! ## CSV Layout
//!
//! | Column | Required | Description |
//! |--------|----------|-------------|
//! | injection | Yes | Acquisition order key |
//! | isotopocule | Yes | Isotopocule label, e.g. `18O` |
//! | role | One of | `reference` (`ref`, `standard`) or `sample` |
//! | is_reference | One of | `true` / `false` (also `TRUE`, `True`, `1`, `yes`) |
//! | ratio | Yes | Mean ratio to the basepeak |
//! | ratio_sem | Yes | Standard error of the ratio |
//! | sample | No | Sample name for replicate grouping |
//! | condition | No | Experimental series label |
//! | basepeak | No | Basepeak identity |

mod error;
mod flag;
mod record;
mod table;


pub use error::TableError;
pub use record::{PartitionKey, RatioRecord, Role};
pub use table::RatioTable;

pub(crate) use flag::deserialize_flag;
pub(crate) use table::delimiter_for;
