//! Parsers for the range formats annotation sources come in.
//!
//! BED-like sources are parsed by [`bed::parse_bedlike()`] (or lazily with
//! [`BedlikeIterator`]); GTF sources by [`gtf::parse_gtf()`], which converts
//! 1-based closed coordinates to the 0-based right-exclusive convention.
//! Every parser yields a [`Result`] per row, so callers decide whether a
//! malformed row is dropped or fatal.

pub mod bed;
pub mod filters;
pub mod gtf;
pub mod utils;

pub use bed::{parse_bedlike, BedlikeIterator};
pub use filters::RowWindow;
pub use gtf::{parse_gtf, GtfRecord};
pub use utils::{parse_column, read_data_lines};
