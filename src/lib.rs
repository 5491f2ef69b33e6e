//! Genomic safe harbor prediction built on a small genomic interval algebra.
//!
//! The library reads per-category feature annotations (genes, oncogenes,
//! microRNAs, tRNAs, lncRNAs, enhancers, centromeres and assembly gaps),
//! flanks every feature, merges everything into one excluded set, and returns
//! the complement of that set within the genome.
//!
//! The main types are:
//!
//!  - [`GenomeIndex`]: the chromosome name to length table.
//!  - [`IntervalSet`]: per-chromosome half-open intervals, with the slop,
//!    sort-merge, concatenate, subtract and intersect operators.
//!  - [`SafeHarborPipeline`]: the orchestrator that runs each category branch and
//!    combines the results.
//!
//! [`GenomeIndex`]: crate::genome::GenomeIndex
//! [`IntervalSet`]: crate::intervals::IntervalSet
//! [`SafeHarborPipeline`]: crate::pipeline::SafeHarborPipeline

pub mod category;
pub mod commands;
pub mod config;
pub mod error;
pub mod genome;
pub mod intervals;
pub mod io;
pub mod merging_iterators;
pub mod pipeline;
pub mod ranges;
pub mod reporting;
pub mod sequences;
pub mod test_utilities;
pub mod traits;

pub use error::SafeHarborError;

/// The type used for all genomic coordinates.
pub type Position = u32;

/// Create an [`IndexMap`] of sequence names and their lengths, e.g. for
/// building a [`GenomeIndex`] in tests.
///
/// ```
/// use safeharbor::prelude::*;
///
/// let sl = seqlens!("chr1" => 1000, "chr2" => 500);
/// let genome = GenomeIndex::new(sl);
/// assert_eq!(genome.get("chr2"), Some(500));
/// ```
///
/// [`IndexMap`]: indexmap::IndexMap
/// [`GenomeIndex`]: crate::genome::GenomeIndex
#[macro_export]
macro_rules! seqlens {
    ($($key:expr => $value:expr),* $(,)?) => {
        $crate::prelude::IndexMap::from([$(($key.to_string(), $value)),*])
    };
}

pub mod prelude {
    pub use crate::category::{Category, FeatureFilter, Normalization, RowWindow};
    pub use crate::config::{CategorySettings, PipelineConfig, PipelineOptions};
    pub use crate::error::SafeHarborError;
    pub use crate::genome::GenomeIndex;
    pub use crate::intervals::{IntervalSet, IntervalState};
    pub use crate::pipeline::{CategoryOutcome, PipelineOutput, SafeHarborPipeline};
    pub use crate::ranges::IntervalRecord;
    pub use crate::seqlens;
    pub use crate::traits::{GenericRange, TsvSerialize};
    pub use crate::Position;
    pub use indexmap::IndexMap;
}
