//! Merging iterators
//!
//! Sweep-line merges over *sorted* input. Each iterator keeps one open run and
//! extends it while the next range is within `minimum_distance` of it; a
//! `minimum_distance` of 0 coalesces overlapping and touching ranges, which is
//! the merge used throughout the pipeline.
//!
//! Merged ranges do not carry pass-through fields, since a run can be built
//! from many input ranges.
use std::cmp::max;

use crate::{
    error::SafeHarborError,
    ranges::{IntervalRecord, RangeFields},
    traits::GenericRange,
    Position,
};

/// Merges a sorted iterator of ranges from a single sequence.
pub struct MergingIterator<I>
where
    I: Iterator,
    I::Item: GenericRange,
{
    last_range: Option<RangeFields>,
    inner: I,
    minimum_distance: Position,
}

impl<I> MergingIterator<I>
where
    I: Iterator,
    I::Item: GenericRange,
{
    pub fn new(inner: I, minimum_distance: Position) -> Self {
        Self {
            last_range: None,
            inner,
            minimum_distance,
        }
    }
}

impl<I> Iterator for MergingIterator<I>
where
    I: Iterator,
    I::Item: GenericRange,
{
    type Item = RangeFields;

    fn next(&mut self) -> Option<Self::Item> {
        for next_range in self.inner.by_ref() {
            if let Some(last_range) = &mut self.last_range {
                if next_range.start() <= last_range.end.saturating_add(self.minimum_distance) {
                    last_range.end = max(last_range.end, next_range.end());
                } else {
                    let return_range = self
                        .last_range
                        .replace(RangeFields::new(next_range.start(), next_range.end()));
                    return return_range;
                }
            } else {
                self.last_range = Some(RangeFields::new(next_range.start(), next_range.end()));
            }
        }
        // inner iterator is exhausted: flush the final run
        self.last_range.take()
    }
}

/// Merges a stream of parsed records, sorted by sequence name and then start
/// position, e.g. the output of a parsing iterator over a sorted BED file.
///
/// Errors from the inner iterator are passed through.
pub struct MergingRecordIterator<I>
where
    I: Iterator<Item = Result<IntervalRecord, SafeHarborError>>,
{
    last_range: Option<IntervalRecord>,
    inner: I,
    minimum_distance: Position,
}

impl<I> MergingRecordIterator<I>
where
    I: Iterator<Item = Result<IntervalRecord, SafeHarborError>>,
{
    pub fn new(inner: I, minimum_distance: Position) -> Self {
        Self {
            last_range: None,
            inner,
            minimum_distance,
        }
    }
}

impl<I> Iterator for MergingRecordIterator<I>
where
    I: Iterator<Item = Result<IntervalRecord, SafeHarborError>>,
{
    type Item = Result<IntervalRecord, SafeHarborError>;

    fn next(&mut self) -> Option<Self::Item> {
        for result in self.inner.by_ref() {
            let next_range = match result {
                Ok(range) => range.into_bed3(),
                Err(e) => return Some(Err(e)),
            };

            if let Some(last_range) = &mut self.last_range {
                let on_same_chrom = last_range.chrom == next_range.chrom;
                if on_same_chrom
                    && next_range.start <= last_range.end.saturating_add(self.minimum_distance)
                {
                    last_range.end = max(last_range.end, next_range.end);
                } else {
                    return self.last_range.replace(next_range).map(Ok);
                }
            } else {
                self.last_range = Some(next_range);
            }
        }
        self.last_range.take().map(Ok)
    }
}
