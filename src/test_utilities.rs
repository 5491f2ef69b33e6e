//! Test cases and test utility functions.
//!

use indexmap::IndexMap;
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::{genome::GenomeIndex, intervals::IntervalSet, ranges::IntervalRecord, Position};

// Stochastic test ranges defaults
//
// This is the random number of range to use in benchmarks.
// The tradeoff is catching stochastic errors vs test time.
pub const NRANDOM_RANGES: usize = 10000;

// range length
pub const MIN_LEN: Position = 1;

/// Build a random range start/end on a sequence of `chrom_len`, at most
/// `max_width` wide. 0-indexed, right exclusive.
pub fn random_range(chrom_len: Position, max_width: Position) -> (Position, Position) {
    let mut rng = thread_rng();
    let max_width = max_width.min(chrom_len).max(MIN_LEN);
    let len = rng.gen_range(MIN_LEN..=max_width);
    let start = rng.gen_range(0..=chrom_len - len);
    (start, start + len)
}

/// Build a [`GenomeIndex`] of `nchrom` chromosomes (`chr1`, `chr2`, ...)
/// with random lengths between 10 and `max_len`.
///
/// The chromosomes are listed in a random order, like a size table sorted
/// by length rather than by name.
pub fn random_index(nchrom: usize, max_len: Position) -> GenomeIndex {
    let mut rng = thread_rng();
    let mut names: Vec<String> = (1..=nchrom).map(|i| format!("chr{}", i)).collect();
    names.shuffle(&mut rng);
    let seqlens: IndexMap<String, Position> = names
        .into_iter()
        .map(|name| (name, rng.gen_range(10..=max_len.max(10))))
        .collect();
    GenomeIndex::new(seqlens)
}

/// Build a raw [`IntervalSet`] of `n` random ranges, each at most 50bp wide,
/// on random chromosomes of `index`.
pub fn random_interval_set(index: &GenomeIndex, n: usize) -> IntervalSet {
    let mut rng = thread_rng();
    let seqlens: Vec<(&String, &Position)> = index.iter().collect();
    let mut set = IntervalSet::new(index).expect("index has unique names");
    for _ in 0..n {
        let (seqname, length) = seqlens[rng.gen_range(0..seqlens.len())];
        let (start, end) = random_range(*length, 50);
        set.push_record(IntervalRecord::new(seqname, start, end, Vec::new()))
            .expect("random range is valid");
    }
    set
}

/// Brute-force per-base coverage of chromosome `seqname` by `set`.
pub fn covered_positions(set: &IntervalSet, seqname: &str, length: Position) -> Vec<bool> {
    let mut covered = vec![false; length as usize];
    for record in set.iter_records().filter(|r| r.chrom == seqname) {
        assert!(
            record.end <= length,
            "{:?} extends past the end of {}",
            record,
            seqname
        );
        for position in record.start..record.end {
            covered[position as usize] = true;
        }
    }
    covered
}

/// Write `contents` to a new temporary file.
pub fn temp_file_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("could not create temporary file");
    file.write_all(contents.as_bytes())
        .expect("could not write temporary file");
    file.flush().expect("could not flush temporary file");
    file
}

/// Write `contents` to `dir/name`, returning the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("could not write test file");
    path
}
