//! The [`GenomeIndex`]: chromosome names and lengths.
//!
//! The index is built once per run from a chromosome-size table and then only
//! read. It keeps the size table's order, but sets built from it store (and
//! write) chromosomes in natural name order.

use indexmap::IndexMap;
use std::path::Path;

use crate::{
    error::SafeHarborError,
    intervals::{IntervalSet, IntervalState},
    io::{parsers::bed::BedlikeIterator, InputFile},
    ranges::{validate_range, IntervalRecord},
    Position,
};

/// An immutable mapping of chromosome name to length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenomeIndex {
    seqlens: IndexMap<String, Position>,
}

impl GenomeIndex {
    pub fn new(seqlens: IndexMap<String, Position>) -> Self {
        Self { seqlens }
    }

    /// Load a [`GenomeIndex`] from a tab-delimited chromosome-size table.
    pub fn from_file(filepath: impl AsRef<Path>) -> Result<Self, SafeHarborError> {
        Ok(Self::new(read_seqlens(filepath)?))
    }

    /// The length of chromosome `seqname`, if it exists.
    pub fn get(&self, seqname: &str) -> Option<Position> {
        self.seqlens.get(seqname).copied()
    }

    /// The length of chromosome `seqname`, or an
    /// [`SafeHarborError::UnknownChromosome`] error.
    pub fn length(&self, seqname: &str) -> Result<Position, SafeHarborError> {
        self.get(seqname)
            .ok_or_else(|| SafeHarborError::UnknownChromosome(seqname.to_string()))
    }

    pub fn contains(&self, seqname: &str) -> bool {
        self.seqlens.contains_key(seqname)
    }

    pub fn seqlens(&self) -> &IndexMap<String, Position> {
        &self.seqlens
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Position)> {
        self.seqlens.iter()
    }

    pub fn len(&self) -> usize {
        self.seqlens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqlens.is_empty()
    }

    /// Build the whole-genome set: one `[0, length)` range per chromosome.
    ///
    /// Zero-length chromosomes have nothing to cover and are left empty. The
    /// result is already in the merged state.
    pub fn whole_genome(&self) -> Result<IntervalSet, SafeHarborError> {
        let mut set = IntervalSet::new(self)?;
        for (seqname, length) in self.iter() {
            if *length > 0 {
                set.push_record(IntervalRecord::new(seqname, 0, *length, Vec::new()))?;
            }
        }
        Ok(set.with_state(IntervalState::Merged))
    }

    /// Read a whole-genome BED file (`chrom  0  length` rows) against this index.
    ///
    /// The rows are sorted and merged, so the result is always in the merged
    /// state even if the file is not. Unlike annotation sources, a malformed
    /// row, an unknown chromosome or a row past the chromosome end here is
    /// fatal.
    pub fn read_whole_genome_bed(
        &self,
        filepath: impl AsRef<Path>,
    ) -> Result<IntervalSet, SafeHarborError> {
        let mut set = IntervalSet::new(self)?;
        for record in BedlikeIterator::new(filepath)? {
            let record = record?;
            validate_range(record.start, record.end, self.length(&record.chrom)?)?;
            set.push_record(record.into_bed3())?;
        }
        Ok(set.sort_merge())
    }
}

/// Read a tab-delimited *genome file* of sequence (i.e. chromosome) names and their lengths.
///
/// Extra columns are ignored; blank lines and `#` comments are skipped.
pub fn read_seqlens(
    filepath: impl AsRef<Path>,
) -> Result<IndexMap<String, Position>, SafeHarborError> {
    let input_file = InputFile::new(filepath.as_ref());
    let lines = input_file.read_lines()?;

    let mut seqlens = IndexMap::new();
    for line in lines {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let mut columns = line.split('\t');
        let (seqname, length) = match (columns.next(), columns.next()) {
            (Some(seqname), Some(length)) => (seqname, length),
            _ => {
                return Err(SafeHarborError::InvalidGenomeFile(format!(
                    "expected two tab-separated columns, got '{}'",
                    line
                )))
            }
        };
        let length: Position = length.trim().parse()?;
        if seqlens.contains_key(seqname) {
            return Err(SafeHarborError::InvalidGenomeFile(format!(
                "sequence '{}' is duplicated",
                seqname
            )));
        }
        seqlens.insert(seqname.to_string(), length);
    }
    Ok(seqlens)
}
