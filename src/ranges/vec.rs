//! A `Vec`-backed range container for a single sequence.

use std::cmp::max;

use crate::{merging_iterators::MergingIterator, traits::GenericRange, Position};

use super::RangeFields;

/// The ranges of one sequence, plus the sequence length they are clamped to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VecRanges {
    pub(crate) ranges: Vec<RangeFields>,
    pub length: Position,
}

impl VecRanges {
    /// Create a new empty [`VecRanges`] container.
    pub fn new(length: Position) -> Self {
        Self {
            ranges: Vec::new(),
            length,
        }
    }

    /// Add a new range to the [`VecRanges`] container.
    pub fn push_range(&mut self, range: RangeFields) {
        self.ranges.push(range)
    }

    /// Return the number of ranges in this [`VecRanges`] container.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Return whether the [`VecRanges`] object is empty (contains no ranges).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the ranges, in their current order.
    pub fn iter_ranges(&self) -> impl Iterator<Item = &RangeFields> + '_ {
        self.ranges.iter()
    }

    /// Sort the ranges by `(start, end)`. The sort is stable, so ranges
    /// with identical coordinates keep their input order.
    pub fn sort(&mut self) {
        self.ranges.sort_by_key(|range| (range.start, range.end));
    }

    /// Total number of basepairs covered by the ranges, counting
    /// overlapping basepairs once per range.
    pub fn total_width(&self) -> u64 {
        self.ranges.iter().map(|r| r.width() as u64).sum()
    }

    /// Sort and merge the ranges, coalescing any ranges that overlap or
    /// touch. The result is sorted, pairwise disjoint and non-adjacent.
    pub fn merge(mut self) -> Self {
        self.sort();
        let ranges = MergingIterator::new(self.ranges.into_iter(), 0).collect();
        Self {
            ranges,
            length: self.length,
        }
    }

    /// Remove from these ranges every basepair covered by `other`.
    ///
    /// Both containers must be merged (sorted, disjoint), which makes this a
    /// single forward sweep over each. Ranges of `self` may be split in two
    /// or removed entirely.
    pub fn subtract(&self, other: &VecRanges) -> Self {
        let mut result = VecRanges::new(self.length);
        let mut j = 0;
        for range in self.ranges.iter() {
            // skip subtrahend ranges that end before this range starts
            while j < other.ranges.len() && other.ranges[j].end <= range.start {
                j += 1;
            }
            let mut cursor = range.start;
            let mut k = j;
            while k < other.ranges.len() && other.ranges[k].start < range.end {
                let cut = &other.ranges[k];
                if cut.start > cursor {
                    result.push_range(RangeFields::new(cursor, cut.start));
                }
                cursor = max(cursor, cut.end);
                if cursor >= range.end {
                    break;
                }
                k += 1;
            }
            if cursor < range.end {
                result.push_range(RangeFields::new(cursor, range.end));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_ranges(length: Position, tuples: &[(Position, Position)]) -> VecRanges {
        let mut vr = VecRanges::new(length);
        for &(s, e) in tuples {
            vr.push_range(RangeFields::new(s, e));
        }
        vr
    }

    fn tuples(vr: &VecRanges) -> Vec<(Position, Position)> {
        vr.iter_ranges().map(|r| r.as_tuple()).collect()
    }

    #[test]
    fn test_sort_keeps_duplicates() {
        let mut vr = vec_ranges(100, &[(10, 20), (0, 5), (10, 20), (0, 3)]);
        vr.sort();
        assert_eq!(tuples(&vr), vec![(0, 3), (0, 5), (10, 20), (10, 20)]);
    }

    #[test]
    fn test_merge() {
        let vr = vec_ranges(100, &[(30, 40), (0, 10), (10, 15), (12, 14), (50, 51)]);
        let merged = vr.merge();
        assert_eq!(tuples(&merged), vec![(0, 15), (30, 40), (50, 51)]);
        assert_eq!(merged.length, 100);
    }

    #[test]
    fn test_merge_idempotent() {
        let vr = vec_ranges(100, &[(30, 40), (0, 10), (5, 15)]);
        let once = vr.merge();
        let twice = once.clone().merge();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_subtract_splits() {
        let a = vec_ranges(1000, &[(0, 1000)]);
        let b = vec_ranges(1000, &[(100, 200), (500, 600)]);
        assert_eq!(
            tuples(&a.subtract(&b)),
            vec![(0, 100), (200, 500), (600, 1000)]
        );
    }

    #[test]
    fn test_subtract_one_cut_spans_several() {
        let a = vec_ranges(100, &[(0, 10), (20, 30), (40, 50)]);
        let b = vec_ranges(100, &[(5, 45)]);
        assert_eq!(tuples(&a.subtract(&b)), vec![(0, 5), (45, 50)]);
    }

    #[test]
    fn test_subtract_edges() {
        let a = vec_ranges(100, &[(10, 20)]);
        // touching the left and right edges removes nothing
        let b = vec_ranges(100, &[(0, 10), (20, 30)]);
        assert_eq!(tuples(&a.subtract(&b)), vec![(10, 20)]);
        // an exact cover removes everything
        let b = vec_ranges(100, &[(10, 20)]);
        assert!(a.subtract(&b).is_empty());
        // empty subtrahend is the identity
        let b = vec_ranges(100, &[]);
        assert_eq!(a.subtract(&b), a);
    }
}
