//! [`IntervalSet`]: per-chromosome collections of half-open ranges, and the
//! set operators the pipeline is built from.
//!
//! # Raw and merged sets
//!
//! An [`IntervalSet`] is in one of two states, tracked by [`IntervalState`]:
//!
//!  - *raw*: arbitrary order, ranges may overlap.
//!  - *merged*: per chromosome, sorted ascending, pairwise disjoint and no two
//!    ranges touching.
//!
//! Operators that need merged input (e.g. [`IntervalSet::subtract()`]) merge a
//! raw operand first rather than produce wrong answers; operators that may
//! break the merged invariant (e.g. [`IntervalSet::slop()`] or
//! [`IntervalSet::extend()`]) return a raw set.
//!
//! # Chromosome order
//!
//! Chromosomes are stored in a [`GenomeMap`], which orders them by natural
//! name sort (`chr2` before `chr10`), whatever the order of the
//! [`GenomeIndex`] the set was created from. This is the order records are
//! iterated and written in. Chromosomes without ranges produce no output.

use genomap::GenomeMap;
use std::{io::Write, path::Path};

use crate::{
    error::SafeHarborError,
    genome::GenomeIndex,
    io::{OutputFile, BED_TSV},
    ranges::{coitrees::COITrees, operations::slop, vec::VecRanges, IntervalRecord},
    traits::TsvSerialize,
    Position,
};

/// Whether an [`IntervalSet`] is known to be sorted and merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntervalState {
    Raw,
    Merged,
}

#[derive(Clone, Debug)]
pub struct IntervalSet {
    pub(crate) ranges: GenomeMap<VecRanges>,
    state: IntervalState,
}

impl IntervalSet {
    /// Create a new empty [`IntervalSet`] with a (empty) range container for
    /// every chromosome in `index`.
    pub fn new(index: &GenomeIndex) -> Result<Self, SafeHarborError> {
        let mut ranges = GenomeMap::new();
        for (seqname, length) in index.iter() {
            ranges.insert(seqname, VecRanges::new(*length))?;
        }
        // an empty set is trivially merged
        Ok(Self {
            ranges,
            state: IntervalState::Merged,
        })
    }

    /// Build a raw [`IntervalSet`] from records.
    pub fn from_records(
        index: &GenomeIndex,
        records: impl IntoIterator<Item = IntervalRecord>,
    ) -> Result<Self, SafeHarborError> {
        let mut set = Self::new(index)?;
        for record in records {
            set.push_record(record)?;
        }
        Ok(set)
    }

    pub(crate) fn with_state(mut self, state: IntervalState) -> Self {
        self.state = state;
        self
    }

    /// Add a record, returning [`SafeHarborError::UnknownChromosome`] if its
    /// chromosome is not in this set's index.
    ///
    /// Records may extend past the chromosome end; they are clamped by
    /// [`IntervalSet::slop()`].
    pub fn push_record(&mut self, record: IntervalRecord) -> Result<(), SafeHarborError> {
        if record.start >= record.end {
            return Err(SafeHarborError::InvalidGenomicRange(record.start, record.end));
        }
        let ranges = self
            .ranges
            .get_mut(&record.chrom)
            .ok_or_else(|| SafeHarborError::UnknownChromosome(record.chrom.clone()))?;
        ranges.push_range(record.into_range());
        self.state = IntervalState::Raw;
        Ok(())
    }

    pub fn state(&self) -> IntervalState {
        self.state
    }

    /// Get the total number of ranges.
    pub fn len(&self) -> usize {
        self.ranges.values().map(|ranges| ranges.len()).sum()
    }

    /// Return whether the [`IntervalSet`] is empty (contains no ranges).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total basepairs across all ranges, counting overlaps once per range
    /// (for a merged set this is the covered width).
    pub fn total_width(&self) -> u64 {
        self.ranges.values().map(|ranges| ranges.total_width()).sum()
    }

    /// Get the raw range container for a chromosome.
    pub fn get_ranges(&self, seqname: &str) -> Option<&VecRanges> {
        self.ranges.get(seqname)
    }

    /// The names of chromosomes with at least one range, in storage order.
    pub fn seqnames(&self) -> Vec<String> {
        self.ranges
            .iter()
            .filter(|(_, ranges)| !ranges.is_empty())
            .map(|(seqname, _)| seqname.to_string())
            .collect()
    }

    /// Iterate over all records, chromosome by chromosome.
    pub fn iter_records(&self) -> impl Iterator<Item = IntervalRecord> + '_ {
        self.ranges.iter().flat_map(|(seqname, ranges)| {
            ranges
                .iter_ranges()
                .map(move |range| range.to_record(seqname))
        })
    }

    /// Sort the ranges of each chromosome by `(start, end)`.
    pub fn sort(mut self) -> Self {
        self.ranges.values_mut().for_each(|ranges| ranges.sort());
        self
    }

    /// Expand every range by `distance` on both sides, clamped to
    /// `[0, length)` using the lengths in `index`.
    ///
    /// Ranges entirely past the end of their chromosome clamp to zero width and
    /// are dropped. The result is raw, since expanded ranges may now overlap.
    pub fn slop(mut self, distance: Position, index: &GenomeIndex) -> Result<Self, SafeHarborError> {
        let mut new_ranges = GenomeMap::new();
        let mut dropped = 0;
        for (seqname, ranges) in take_ranges(&mut self.ranges) {
            let length = index.length(&seqname)?;
            let mut sloped = VecRanges::new(length);
            for range in ranges.ranges.into_iter() {
                match slop(range, distance, length) {
                    Some(range) => sloped.push_range(range),
                    None => dropped += 1,
                }
            }
            new_ranges.insert(&seqname, sloped)?;
        }
        if dropped > 0 {
            log::debug!(
                "dropped {} range(s) lying past the end of their chromosome",
                dropped
            );
        }
        Ok(Self {
            ranges: new_ranges,
            state: IntervalState::Raw,
        })
    }

    /// Sort and merge the ranges of each chromosome, coalescing ranges that
    /// overlap or touch. Merged ranges carry no extra fields.
    pub fn sort_merge(mut self) -> Self {
        if self.state == IntervalState::Merged {
            return self;
        }
        for ranges in self.ranges.values_mut() {
            *ranges = std::mem::take(ranges).merge();
        }
        self.state = IntervalState::Merged;
        self
    }

    /// Drop all extra fields, leaving three-column ranges.
    pub fn to_bed3(mut self) -> Self {
        for ranges in self.ranges.values_mut() {
            for range in ranges.ranges.iter_mut() {
                range.fields.clear();
            }
        }
        self
    }

    /// Append all ranges of `other` to this set, without merging.
    ///
    /// Every chromosome of `other` with ranges must exist in this set.
    pub fn extend(&mut self, mut other: IntervalSet) -> Result<(), SafeHarborError> {
        for (seqname, ranges) in take_ranges(&mut other.ranges) {
            if ranges.is_empty() {
                continue;
            }
            let target = self
                .ranges
                .get_mut(&seqname)
                .ok_or_else(|| SafeHarborError::UnknownChromosome(seqname.clone()))?;
            target.ranges.extend(ranges.ranges);
            self.state = IntervalState::Raw;
        }
        Ok(())
    }

    /// Concatenate sets, in the order given, into one raw set over `index`.
    pub fn concat(
        index: &GenomeIndex,
        sets: impl IntoIterator<Item = IntervalSet>,
    ) -> Result<Self, SafeHarborError> {
        let mut combined = Self::new(index)?;
        for set in sets {
            combined.extend(set)?;
        }
        Ok(combined)
    }

    /// Remove every basepair covered by `other` from this set.
    ///
    /// Raw operands are merged first; the result is merged. Chromosomes absent
    /// from `other` pass through unchanged, and chromosomes only in `other`
    /// contribute nothing.
    pub fn subtract(self, other: &IntervalSet) -> Self {
        let left = self.sort_merge();
        let merged_other;
        let right = if other.state == IntervalState::Merged {
            other
        } else {
            merged_other = other.clone().sort_merge();
            &merged_other
        };

        let mut result = left;
        for (seqname, cuts) in right.ranges.iter() {
            if let Some(ranges) = result.ranges.get_mut(seqname) {
                *ranges = ranges.subtract(cuts);
            }
        }
        result
    }

    /// Keep only the ranges of this set that overlap at least one range of
    /// `right` on the same chromosome.
    ///
    /// In database lingo, this is a *semi join*: kept ranges are whole and
    /// unmodified (with their fields), and appear once no matter how many
    /// `right` ranges they overlap. Order is preserved.
    pub fn filter_overlaps(&self, right: &IntervalSet) -> Result<Self, SafeHarborError> {
        let mut new_ranges = GenomeMap::new();
        for (seqname, left_ranges) in self.ranges.iter() {
            let mut kept = VecRanges::new(left_ranges.length);
            if let Some(right_ranges) = right.ranges.get(seqname) {
                if !right_ranges.is_empty() {
                    let trees = COITrees::from_vec_ranges(right_ranges)?;
                    for range in left_ranges.iter_ranges() {
                        if trees.has_overlaps(range.start, range.end)? {
                            kept.push_range(range.clone());
                        }
                    }
                }
            }
            new_ranges.insert(seqname, kept)?;
        }
        Ok(Self {
            ranges: new_ranges,
            state: self.state,
        })
    }

    /// Keep only chromosomes whose name satisfies `keep`.
    pub fn retain_seqnames<F>(mut self, keep: F) -> Result<Self, SafeHarborError>
    where
        F: Fn(&str) -> bool,
    {
        let mut new_ranges = GenomeMap::new();
        for (seqname, ranges) in take_ranges(&mut self.ranges) {
            if keep(&seqname) {
                new_ranges.insert(&seqname, ranges)?;
            }
        }
        Ok(Self {
            ranges: new_ranges,
            state: self.state,
        })
    }

    /// Drop alternate and unplaced contigs, i.e. chromosomes whose name
    /// contains an underscore.
    pub fn exclude_contigs(self) -> Result<Self, SafeHarborError> {
        self.retain_seqnames(|seqname| !is_alternate_contig(seqname))
    }

    /// Write the records as BED to `writer`.
    pub fn write_bed(&self, writer: &mut dyn Write) -> Result<(), SafeHarborError> {
        for record in self.iter_records() {
            writeln!(writer, "{}", record.to_tsv(&BED_TSV))?;
        }
        Ok(())
    }

    /// Write the records as BED to a file, or standard output if `None`.
    /// A `.gz` extension writes gzip-compressed output.
    pub fn to_tsv(&self, output: Option<&Path>) -> Result<(), SafeHarborError> {
        let output = OutputFile::from_option(output);
        let mut writer = output.writer()?;
        self.write_bed(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Two sets are equal if they are in the same state and have the same
/// records in the same order.
impl PartialEq for IntervalSet {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state && self.iter_records().eq(other.iter_records())
    }
}

/// Move every chromosome's ranges out of `ranges`, each paired with its
/// chromosome name.
///
/// Names are looked up one by one, as [`GenomeMap`] iterates names in sorted
/// order while its values are stored in insertion order.
fn take_ranges(ranges: &mut GenomeMap<VecRanges>) -> Vec<(String, VecRanges)> {
    let seqnames: Vec<String> = ranges
        .iter()
        .map(|(seqname, _)| seqname.to_string())
        .collect();
    seqnames
        .into_iter()
        .filter_map(|seqname| {
            let taken = std::mem::take(ranges.get_mut(&seqname)?);
            Some((seqname, taken))
        })
        .collect()
}

/// Whether a chromosome name denotes an alternate or unplaced contig.
pub fn is_alternate_contig(seqname: &str) -> bool {
    seqname.contains('_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        seqlens,
        test_utilities::{covered_positions, random_index, random_interval_set},
    };

    fn chr1_index(length: Position) -> GenomeIndex {
        GenomeIndex::new(seqlens!("chr1" => length))
    }

    fn set_of(index: &GenomeIndex, records: &[(&str, Position, Position)]) -> IntervalSet {
        IntervalSet::from_records(
            index,
            records
                .iter()
                .map(|&(chrom, start, end)| IntervalRecord::new(chrom, start, end, vec![])),
        )
        .unwrap()
    }

    fn tuples(set: &IntervalSet) -> Vec<(String, Position, Position)> {
        set.iter_records()
            .map(|r| (r.chrom, r.start, r.end))
            .collect()
    }

    #[test]
    fn test_push_unknown_chromosome() {
        let index = chr1_index(100);
        let mut set = IntervalSet::new(&index).unwrap();
        let result = set.push_record(IntervalRecord::new("chr2", 0, 10, vec![]));
        assert!(matches!(result, Err(SafeHarborError::UnknownChromosome(name)) if name == "chr2"));
        assert!(set.is_empty());
        assert_eq!(set.state(), IntervalState::Merged);
    }

    #[test]
    fn test_push_empty_range() {
        let index = chr1_index(100);
        let mut set = IntervalSet::new(&index).unwrap();
        assert!(set
            .push_record(IntervalRecord::new("chr1", 10, 10, vec![]))
            .is_err());
    }

    #[test]
    fn test_complement_scenario() {
        // chr1 of length 1000 with two excluded regions
        let index = chr1_index(1000);
        let excluded = set_of(&index, &[("chr1", 500, 520), ("chr1", 100, 200)]).sort_merge();
        let safe = index.whole_genome().unwrap().subtract(&excluded);
        assert_eq!(
            tuples(&safe),
            vec![
                ("chr1".to_string(), 0, 100),
                ("chr1".to_string(), 200, 500),
                ("chr1".to_string(), 520, 1000),
            ]
        );
    }

    #[test]
    fn test_overlapping_contributions_merge() {
        let index = chr1_index(1000);
        let first = set_of(&index, &[("chr1", 100, 300)]);
        let second = set_of(&index, &[("chr1", 250, 400)]);
        let combined = IntervalSet::concat(&index, vec![first, second]).unwrap();
        assert_eq!(combined.len(), 2);
        assert_eq!(combined.state(), IntervalState::Raw);
        let merged = combined.sort_merge();
        assert_eq!(tuples(&merged), vec![("chr1".to_string(), 100, 400)]);
    }

    #[test]
    fn test_concat_keeps_order() {
        let index = GenomeIndex::new(seqlens!("chr1" => 1000, "chr2" => 1000));
        let first = set_of(&index, &[("chr2", 5, 10), ("chr1", 50, 60)]);
        let second = set_of(&index, &[("chr1", 0, 10)]);
        let combined = IntervalSet::concat(&index, vec![first, second]).unwrap();
        assert_eq!(
            tuples(&combined),
            vec![
                ("chr1".to_string(), 50, 60),
                ("chr1".to_string(), 0, 10),
                ("chr2".to_string(), 5, 10),
            ]
        );
    }

    #[test]
    fn test_slop_clamped_at_chromosome_end() {
        let index = chr1_index(1000);
        let set = set_of(&index, &[("chr1", 900, 950)]);
        let sloped = set.slop(100, &index).unwrap();
        assert_eq!(tuples(&sloped), vec![("chr1".to_string(), 800, 1000)]);
        assert_eq!(sloped.state(), IntervalState::Raw);
    }

    #[test]
    fn test_slop_drops_out_of_bounds() {
        let index = chr1_index(1000);
        let set = set_of(&index, &[("chr1", 1500, 1600), ("chr1", 10, 20)]);
        let sloped = set.slop(10, &index).unwrap();
        assert_eq!(tuples(&sloped), vec![("chr1".to_string(), 0, 30)]);
    }

    #[test]
    fn test_slop_unknown_chromosome() {
        let big = GenomeIndex::new(seqlens!("chr1" => 1000, "chr2" => 1000));
        let set = set_of(&big, &[("chr2", 10, 20)]);
        let result = set.slop(10, &chr1_index(1000));
        assert!(matches!(result, Err(SafeHarborError::UnknownChromosome(name)) if name == "chr2"));
    }

    #[test]
    fn test_subtract_missing_chromosomes() {
        let index = GenomeIndex::new(seqlens!("chr1" => 100, "chr2" => 100));
        let left = set_of(&index, &[("chr1", 0, 100)]);
        let right = set_of(&index, &[("chr2", 0, 50)]);
        // chr2 is only in the subtrahend and contributes nothing
        assert_eq!(
            tuples(&left.clone().subtract(&right)),
            vec![("chr1".to_string(), 0, 100)]
        );
        // a subtrahend without the chromosome at all passes ranges through
        let only_chr2 = GenomeIndex::new(seqlens!("chr2" => 100));
        let right = set_of(&only_chr2, &[("chr2", 0, 50)]);
        assert_eq!(
            tuples(&left.subtract(&right)),
            vec![("chr1".to_string(), 0, 100)]
        );
    }

    #[test]
    fn test_subtract_raw_operands() {
        let index = chr1_index(100);
        let left = set_of(&index, &[("chr1", 50, 100), ("chr1", 0, 60)]);
        let right = set_of(&index, &[("chr1", 30, 40), ("chr1", 10, 35)]);
        let result = left.subtract(&right);
        assert_eq!(result.state(), IntervalState::Merged);
        assert_eq!(
            tuples(&result),
            vec![("chr1".to_string(), 0, 10), ("chr1".to_string(), 40, 100)]
        );
    }

    #[test]
    fn test_filter_overlaps_semi_join() {
        let index = GenomeIndex::new(seqlens!("chr1" => 1000, "chr2" => 1000));
        let left = IntervalSet::from_records(
            &index,
            vec![
                IntervalRecord::new("chr1", 0, 10, vec!["a".to_string()]),
                IntervalRecord::new("chr1", 10, 20, vec!["b".to_string()]),
                IntervalRecord::new("chr1", 100, 200, vec!["c".to_string()]),
                IntervalRecord::new("chr2", 0, 10, vec!["d".to_string()]),
            ],
        )
        .unwrap();
        // two right ranges overlap "c", one touches "b" without overlapping
        let right = set_of(&index, &[("chr1", 5, 10), ("chr1", 110, 120), ("chr1", 150, 160)]);
        let kept = left.filter_overlaps(&right).unwrap();
        let records: Vec<_> = kept.iter_records().collect();
        assert_eq!(
            records,
            vec![
                IntervalRecord::new("chr1", 0, 10, vec!["a".to_string()]),
                IntervalRecord::new("chr1", 100, 200, vec!["c".to_string()]),
            ]
        );
    }

    #[test]
    fn test_exclude_contigs() {
        let index = GenomeIndex::new(seqlens!(
            "chr1" => 100,
            "chr1_KN150525v1_alt" => 100,
            "chrUn_KN147636v1" => 50
        ));
        let whole = index.whole_genome().unwrap();
        assert_eq!(whole.seqnames().len(), 3);
        let filtered = whole.exclude_contigs().unwrap();
        assert_eq!(filtered.seqnames(), vec!["chr1".to_string()]);
    }

    #[test]
    fn test_to_bed3_and_write() {
        let index = chr1_index(100);
        let set = IntervalSet::from_records(
            &index,
            vec![IntervalRecord::new("chr1", 1, 5, vec!["x".to_string(), "".to_string()])],
        )
        .unwrap();
        let mut buffer = Vec::new();
        set.write_bed(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "chr1\t1\t5\tx\t.\n");

        let mut buffer = Vec::new();
        set.to_bed3().write_bed(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "chr1\t1\t5\n");
    }

    #[test]
    fn test_slop_unsorted_index() {
        // size tables are often ordered by length rather than by name
        let index = GenomeIndex::new(seqlens!("chr2" => 100, "chr1" => 1000));
        let set = set_of(&index, &[("chr1", 900, 950), ("chr2", 40, 60)]);
        let sloped = set.slop(100, &index).unwrap();
        assert_eq!(
            tuples(&sloped),
            vec![("chr1".to_string(), 800, 1000), ("chr2".to_string(), 0, 100)]
        );
        assert_eq!(sloped.get_ranges("chr1").unwrap().length, 1000);
    }

    #[test]
    fn test_concat_unsorted_index() {
        let index = GenomeIndex::new(seqlens!("chr2" => 2000, "chr1" => 1000));
        let first = set_of(&index, &[("chr1", 100, 200)]);
        let second = set_of(&index, &[("chr2", 300, 400)]);
        let combined = IntervalSet::concat(&index, vec![first, second]).unwrap();
        assert_eq!(
            tuples(&combined),
            vec![("chr1".to_string(), 100, 200), ("chr2".to_string(), 300, 400)]
        );

        let safe = index.whole_genome().unwrap().subtract(&combined.sort_merge());
        assert_eq!(
            tuples(&safe),
            vec![
                ("chr1".to_string(), 0, 100),
                ("chr1".to_string(), 200, 1000),
                ("chr2".to_string(), 0, 300),
                ("chr2".to_string(), 400, 2000),
            ]
        );
    }

    #[test]
    fn test_exclude_contigs_unsorted_index() {
        let index = GenomeIndex::new(seqlens!("chrUn_a" => 50, "chr1" => 1000));
        let filtered = index.whole_genome().unwrap().exclude_contigs().unwrap();
        assert_eq!(tuples(&filtered), vec![("chr1".to_string(), 0, 1000)]);
    }

    #[test]
    fn test_random_slop_coverage() {
        for _ in 0..20 {
            let index = random_index(4, 500);
            let set = random_interval_set(&index, 50);
            let sloped = set.clone().slop(25, &index).unwrap();
            for (seqname, length) in index.iter() {
                let mut expected = vec![false; *length as usize];
                for record in set.iter_records().filter(|r| r.chrom == *seqname) {
                    let start = record.start.saturating_sub(25);
                    let end = (record.end + 25).min(*length);
                    for p in start..end {
                        expected[p as usize] = true;
                    }
                }
                assert_eq!(covered_positions(&sloped, seqname, *length), expected);
            }
        }
    }

    #[test]
    fn test_random_merge_idempotent_and_disjoint() {
        for _ in 0..20 {
            let index = random_index(3, 1000);
            let set = random_interval_set(&index, 200);
            let once = set.sort_merge();
            let twice = once.clone().with_state(IntervalState::Raw).sort_merge();
            assert_eq!(once, twice);

            for seqname in once.seqnames() {
                let ranges: Vec<_> = once
                    .get_ranges(&seqname)
                    .unwrap()
                    .iter_ranges()
                    .cloned()
                    .collect();
                for pair in ranges.windows(2) {
                    assert!(pair[0].end < pair[1].start);
                }
            }
        }
    }

    #[test]
    fn test_random_merge_preserves_coverage() {
        for _ in 0..20 {
            let index = random_index(3, 500);
            let set = random_interval_set(&index, 100);
            let merged = set.clone().sort_merge();
            for (seqname, length) in index.iter() {
                assert_eq!(
                    covered_positions(&set, seqname, *length),
                    covered_positions(&merged, seqname, *length)
                );
            }
        }
    }

    #[test]
    fn test_random_subtract_self_annihilation() {
        for _ in 0..20 {
            let index = random_index(3, 1000);
            let merged = random_interval_set(&index, 100).sort_merge();
            assert!(merged.clone().subtract(&merged).is_empty());
        }
    }

    #[test]
    fn test_random_complement_correctness() {
        for _ in 0..20 {
            let index = random_index(4, 500);
            let excluded = random_interval_set(&index, 50)
                .slop(25, &index)
                .unwrap()
                .sort_merge();
            let whole = index.whole_genome().unwrap();
            let safe = whole.clone().subtract(&excluded);
            for (seqname, length) in index.iter() {
                let in_whole = covered_positions(&whole, seqname, *length);
                let in_excluded = covered_positions(&excluded, seqname, *length);
                let in_safe = covered_positions(&safe, seqname, *length);
                for p in 0..(*length as usize) {
                    assert_eq!(in_safe[p], in_whole[p] && !in_excluded[p]);
                }
            }
        }
    }

    #[test]
    fn test_random_slop_bounds() {
        for _ in 0..20 {
            let index = random_index(3, 1000);
            let sloped = random_interval_set(&index, 100).slop(300, &index).unwrap();
            for record in sloped.iter_records() {
                assert!(record.start < record.end);
                assert!(record.end <= index.get(&record.chrom).unwrap());
            }
        }
    }
}
