//! The [`SafeHarborError`] `enum` definition and error messages.
//!
use crate::{category::Category, Position};
use genomap::GenomeMapError;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// The [`SafeHarborError`] defines the standard set of errors that should
/// be passed to the user.
#[derive(Debug, Error)]
pub enum SafeHarborError {
    // IO related errors
    #[error("File reading error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("TSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    // File parsing related errors
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("Genome file is invalid: {0}")]
    InvalidGenomeFile(String),
    #[error("Malformed record ({reason}).\nLine: {line}")]
    MalformedRecord { line: String, reason: String },
    #[error("Unknown feature category '{0}'")]
    UnknownCategory(String),

    // Invalid genomic range errors
    #[error("Range invalid: start ({0}) must be less than end ({1})")]
    InvalidGenomicRange(Position, Position),
    #[error("Range [{0}, {1}) is invalid for sequence of length {2}")]
    InvalidGenomicRangeForSequence(Position, Position, Position),
    #[error("Position {0} is too large for the interval tree index")]
    PositionOverflow(Position),
    #[error("Chromosome '{0}' is not in the genome index; check that the annotation and genome builds match")]
    UnknownChromosome(String),
    #[error("Error encountered in genomap::GenomeMap")]
    GenomeMapError(#[from] GenomeMapError),
    #[error("Input is not sorted by chromosome and start position at line: {0}")]
    UnsortedInput(String),
    #[error("Invalid sequence region: {0}")]
    InvalidRegion(String),

    // Pipeline related errors
    #[error("Source file for category '{category}' not found: {}", .path.display())]
    MissingSource { category: Category, path: PathBuf },
    #[error("Category '{category}' needs the '{reference}' annotation, which could not be loaded: {reason}")]
    ReferenceUnavailable {
        category: Category,
        reference: Category,
        reason: String,
    },
    #[error("Category '{category}' failed: {source}")]
    CategoryFailed {
        category: Category,
        source: Box<SafeHarborError>,
    },
}

impl SafeHarborError {
    /// Build a [`SafeHarborError::MalformedRecord`] for a line.
    pub fn malformed(line: &str, reason: impl Into<String>) -> Self {
        SafeHarborError::MalformedRecord {
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error only concerns a single record, and so the record
    /// can be dropped while parsing continues.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            SafeHarborError::MalformedRecord { .. } | SafeHarborError::InvalidGenomicRange(..)
        )
    }

    /// Attach a category to a branch error.
    pub fn in_category(self, category: Category) -> Self {
        match self {
            SafeHarborError::CategoryFailed { .. } => self,
            other => SafeHarborError::CategoryFailed {
                category,
                source: Box::new(other),
            },
        }
    }
}
