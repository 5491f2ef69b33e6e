//! Types and methods for reading and parsing input and writing output.

pub mod file;
pub mod parsers;
pub mod tsv;

pub use file::{InputFile, OutputFile};
pub use parsers::{parse_bedlike, parse_gtf, BedlikeIterator, GtfRecord, RowWindow};
pub use tsv::BED_TSV;
