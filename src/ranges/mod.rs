//! Range and Range Containers.
//!
//! All ranges are 0-indexed and right-exclusive, i.e. `[start, end)`.
//!
//!  - [`IntervalRecord`]: a range with its sequence name and pass-through fields,
//!    as yielded by the parsing iterators and written by the serializers.
//!  - [`RangeFields`]: a range stored inside a per-sequence container, where the
//!    sequence name is implied by the container.

use crate::{
    error::SafeHarborError,
    io::tsv::TsvConfig,
    traits::{AdjustableGenericRange, GenericRange, TsvSerialize},
    Position,
};

pub mod coitrees;
pub mod operations;
pub mod vec;

/// A range in a range container, with its opaque extra columns (name,
/// score, strand, etc.).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeFields {
    pub start: Position,
    pub end: Position,
    pub fields: Vec<String>,
}

impl RangeFields {
    /// Create a new 0-indexed right-exclusive range with no extra fields.
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            fields: Vec::new(),
        }
    }

    /// Create a new 0-indexed right-exclusive range carrying `fields`.
    pub fn with_fields(start: Position, end: Position, fields: Vec<String>) -> Self {
        Self { start, end, fields }
    }

    /// Attach a sequence name, turning this into an [`IntervalRecord`].
    pub fn to_record(&self, chrom: &str) -> IntervalRecord {
        IntervalRecord::new(chrom, self.start, self.end, self.fields.clone())
    }
}

impl GenericRange for RangeFields {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

impl AdjustableGenericRange for RangeFields {
    fn set_start(&mut self, start: Position) {
        self.start = start
    }
    fn set_end(&mut self, end: Position) {
        self.end = end
    }
}

/// Represents a parsed interval: `chrom`, half-open `[start, end)` and
/// any remaining columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRecord {
    pub chrom: String,
    pub start: Position,
    pub end: Position,
    pub fields: Vec<String>,
}

impl IntervalRecord {
    pub fn new(chrom: &str, start: Position, end: Position, fields: Vec<String>) -> Self {
        Self {
            chrom: chrom.to_string(),
            start,
            end,
            fields,
        }
    }

    /// Drop the sequence name, keeping the range and its fields.
    pub fn into_range(self) -> RangeFields {
        RangeFields::with_fields(self.start, self.end, self.fields)
    }

    /// Project to the canonical three BED columns, dropping any extra fields.
    pub fn into_bed3(mut self) -> Self {
        self.fields.clear();
        self
    }
}

impl GenericRange for IntervalRecord {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

impl AdjustableGenericRange for IntervalRecord {
    fn set_start(&mut self, start: Position) {
        self.start = start
    }
    fn set_end(&mut self, end: Position) {
        self.end = end
    }
}

impl TsvSerialize for IntervalRecord {
    fn to_tsv(&self, config: &TsvConfig) -> String {
        if self.fields.is_empty() {
            format!("{}\t{}\t{}", self.chrom, self.start, self.end)
        } else {
            format!(
                "{}\t{}\t{}\t{}",
                self.chrom,
                self.start,
                self.end,
                self.fields.to_tsv(config)
            )
        }
    }
}

/// Validates whether a given range is valid for a sequence of a given `length`.
///
/// A range is valid if it is non-empty (`start < end`) and does not extend
/// past the end of the sequence (`end <= length`).
pub fn validate_range(
    start: Position,
    end: Position,
    length: Position,
) -> Result<(), SafeHarborError> {
    if start >= end {
        return Err(SafeHarborError::InvalidGenomicRange(start, end));
    }

    if end > length {
        return Err(SafeHarborError::InvalidGenomicRangeForSequence(
            start, end, length,
        ));
    }
    Ok(())
}
