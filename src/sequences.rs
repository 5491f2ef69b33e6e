//! Sequence extraction for a region set.
//!
//! Regions are read from an indexed FASTA reference (a `.fai` index must sit
//! next to the FASTA file) with the [`noodles::fasta`] indexed reader.
//! Each region is written as one FASTA record named `chrom:start-end`, with the
//! 0-based, right-exclusive coordinates of the region, and the whole sequence
//! on a single line.

use noodles::core::{Position as NoodlesPosition, Region};
use noodles::fasta::indexed_reader;
use std::io::Write;
use std::path::Path;

use crate::{error::SafeHarborError, intervals::IntervalSet, io::OutputFile, Position};

/// The FASTA record name of a region.
pub fn region_name(seqname: &str, start: Position, end: Position) -> String {
    format!("{}:{}-{}", seqname, start, end)
}

/// Convert a 0-based right-exclusive range to a 1-based closed [`Region`].
fn to_region(seqname: &str, start: Position, end: Position) -> Result<Region, SafeHarborError> {
    let invalid = || SafeHarborError::InvalidRegion(region_name(seqname, start, end));
    let first = NoodlesPosition::try_from(start as usize + 1).map_err(|_| invalid())?;
    let last = NoodlesPosition::try_from(end as usize).map_err(|_| invalid())?;
    Ok(Region::new(seqname.as_bytes().to_vec(), first..=last))
}

/// Write the sequence of every region in `set` as FASTA to `output` (or
/// standard output), returning the number of records written.
pub fn extract_sequences(
    fasta: impl AsRef<Path>,
    set: &IntervalSet,
    output: Option<&Path>,
) -> Result<usize, SafeHarborError> {
    let mut reader = indexed_reader::Builder::default().build_from_path(fasta.as_ref())?;
    let output = OutputFile::from_option(output);
    let mut writer = output.writer()?;

    let mut written = 0;
    for record in set.iter_records() {
        let region = to_region(&record.chrom, record.start, record.end)?;
        let fasta_record = reader.query(&region)?;
        writeln!(writer, ">{}", region_name(&record.chrom, record.start, record.end))?;
        writer.write_all(fasta_record.sequence().as_ref())?;
        writeln!(writer)?;
        written += 1;
    }
    writer.flush()?;
    log::info!("wrote {} sequence(s)", written);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{genome::GenomeIndex, ranges::IntervalRecord, seqlens, test_utilities::write_file};

    #[test]
    fn test_region_name() {
        assert_eq!(region_name("chr1", 0, 100), "chr1:0-100");
    }

    #[test]
    fn test_extract_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = write_file(dir.path(), "genome.fa", ">chr1\nACGTACGTAC\nGGGG\n>chr2\nTTTTT\n");
        write_file(
            dir.path(),
            "genome.fa.fai",
            "chr1\t14\t6\t10\t11\nchr2\t5\t28\t5\t6\n",
        );
        let index = GenomeIndex::new(seqlens!("chr1" => 14, "chr2" => 5));
        let set = IntervalSet::from_records(
            &index,
            vec![
                IntervalRecord::new("chr1", 1, 5, vec![]),
                IntervalRecord::new("chr1", 8, 12, vec![]),
                IntervalRecord::new("chr2", 0, 5, vec![]),
            ],
        )
        .unwrap();

        let output = dir.path().join("out.fa");
        let written = extract_sequences(&fasta, &set, Some(&output)).unwrap();
        assert_eq!(written, 3);
        let contents = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            contents,
            ">chr1:1-5\nCGTA\n>chr1:8-12\nACGG\n>chr2:0-5\nTTTTT\n"
        );
    }
}
