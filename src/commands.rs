//! Command implementations behind the `safeharbor` subcommands.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use crate::{
    config::{PipelineConfig, PipelineOptions},
    error::SafeHarborError,
    genome::GenomeIndex,
    intervals::IntervalSet,
    io::{parsers::BedlikeIterator, OutputFile, BED_TSV},
    merging_iterators::MergingRecordIterator,
    pipeline::{CategoryOutcome, PipelineOutput, SafeHarborPipeline},
    ranges::{operations::slop, IntervalRecord},
    reporting::{CommandOutput, Report},
    sequences::extract_sequences,
    traits::TsvSerialize,
    Position,
};

/// Where `safeharbor predict` writes its results.
#[derive(Clone, Debug, Default)]
pub struct PredictOutputs<'a> {
    /// The safe harbor BED file (standard output if `None`).
    pub safe_harbors: Option<&'a Path>,
    /// The merged excluded-region BED file, if wanted.
    pub excluded: Option<&'a Path>,
    /// An indexed FASTA reference and the FASTA file to write region
    /// sequences to.
    pub sequences: Option<(&'a Path, &'a Path)>,
}

/// Run the full pipeline and write its outputs.
pub fn safeharbor_predict(
    seqlens: &Path,
    config: PipelineConfig,
    options: PipelineOptions,
    outputs: &PredictOutputs,
) -> Result<CommandOutput<PipelineOutput>, SafeHarborError> {
    let index = GenomeIndex::from_file(seqlens)?;
    let pipeline = SafeHarborPipeline::new(index, config).with_options(options);
    let output = pipeline.run()?;

    let mut report = Report::new();
    for (category, outcome) in output.outcomes.iter() {
        match outcome {
            CategoryOutcome::Disabled => {}
            CategoryOutcome::Skipped { path } => report.add_issue(
                SafeHarborError::MissingSource {
                    category: *category,
                    path: path.clone(),
                }
                .to_string(),
            ),
            CategoryOutcome::Failed { error } => report.add_issue(error.to_string()),
            CategoryOutcome::Processed(summary) => {
                if summary.malformed > 0 {
                    report.add_issue(format!(
                        "{} malformed row(s) were dropped from the {} source",
                        summary.malformed, category
                    ));
                }
            }
        }
    }

    output.safe_harbors.to_tsv(outputs.safe_harbors)?;
    if let Some(path) = outputs.excluded {
        output.excluded.to_tsv(Some(path))?;
    }
    if let Some((fasta, fasta_output)) = outputs.sequences {
        extract_sequences(fasta, &output.safe_harbors, Some(fasta_output))?;
    }
    Ok(CommandOutput::new(output, report))
}

/// Read a BED-like file into an [`IntervalSet`], dropping (and reporting)
/// malformed rows. Unknown chromosomes are an error.
fn read_bed_set(
    bedfile: &Path,
    index: &GenomeIndex,
    report: &mut Report,
) -> Result<IntervalSet, SafeHarborError> {
    let mut set = IntervalSet::new(index)?;
    let mut malformed = 0;
    for result in BedlikeIterator::new(bedfile)? {
        match result {
            Ok(record) => set.push_record(record)?,
            Err(e) if e.is_record_level() => malformed += 1,
            Err(e) => return Err(e),
        }
    }
    if malformed > 0 {
        report.add_issue(format!(
            "{} malformed row(s) were dropped from {}",
            malformed,
            bedfile.display()
        ));
    }
    Ok(set)
}

/// Expand each range of a BED file by `distance` on both sides, clamped to
/// the chromosome bounds.
///
/// Without `merge`, records are streamed in input order with their extra
/// columns; with `merge`, the output is sorted, merged, three-column BED.
pub fn safeharbor_slop(
    seqlens: &Path,
    bedfile: &Path,
    distance: Position,
    output: Option<&Path>,
    merge: bool,
) -> Result<CommandOutput<()>, SafeHarborError> {
    let index = GenomeIndex::from_file(seqlens)?;
    let mut report = Report::new();

    if merge {
        let set = read_bed_set(bedfile, &index, &mut report)?;
        set.to_bed3().slop(distance, &index)?.sort_merge().to_tsv(output)?;
        return Ok(CommandOutput::new((), report));
    }

    let output_file = OutputFile::from_option(output);
    let mut writer = output_file.writer()?;
    let mut malformed = 0;
    let mut skipped_ranges = 0;
    for result in BedlikeIterator::new(bedfile)? {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_record_level() => {
                malformed += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        let length = index.length(&record.chrom)?;
        match slop(record, distance, length) {
            Some(record) => writeln!(writer, "{}", record.to_tsv(&BED_TSV))?,
            None => skipped_ranges += 1,
        }
    }
    writer.flush()?;

    if malformed > 0 {
        report.add_issue(format!(
            "{} malformed row(s) were dropped from {}",
            malformed,
            bedfile.display()
        ));
    }
    if skipped_ranges > 0 {
        report.add_issue(format!(
            "{} range(s) were removed because they lie past the end of their chromosome",
            skipped_ranges
        ));
    }
    Ok(CommandOutput::new((), report))
}

/// Merge overlapping and touching ranges of a BED file.
///
/// With a genome file, input may be in any order. Without one, the input is
/// streamed and must be sorted by chromosome, then start.
pub fn safeharbor_merge(
    seqlens: Option<&Path>,
    bedfile: &Path,
    output: Option<&Path>,
) -> Result<CommandOutput<()>, SafeHarborError> {
    let mut report = Report::new();

    if let Some(seqlens) = seqlens {
        let index = GenomeIndex::from_file(seqlens)?;
        read_bed_set(bedfile, &index, &mut report)?
            .sort_merge()
            .to_tsv(output)?;
        return Ok(CommandOutput::new((), report));
    }

    let output_file = OutputFile::from_option(output);
    let mut writer = output_file.writer()?;
    let mut malformed = 0;
    let records = BedlikeIterator::new(bedfile)?.filter(|result| match result {
        Err(e) if e.is_record_level() => {
            malformed += 1;
            false
        }
        _ => true,
    });
    let sorted = SortednessCheck::new(records);
    for result in MergingRecordIterator::new(sorted, 0) {
        writeln!(writer, "{}", result?.to_tsv(&BED_TSV))?;
    }
    writer.flush()?;

    if malformed > 0 {
        report.add_issue(format!(
            "{} malformed row(s) were dropped from {}",
            malformed,
            bedfile.display()
        ));
    }
    Ok(CommandOutput::new((), report))
}

/// Passes records through, yielding an error at the first record that is
/// out of (chromosome, start) order.
struct SortednessCheck<I> {
    inner: I,
    last: Option<(String, Position)>,
    seen: HashSet<String>,
}

impl<I> SortednessCheck<I> {
    fn new(inner: I) -> Self {
        Self {
            inner,
            last: None,
            seen: HashSet::new(),
        }
    }
}

impl<I> Iterator for SortednessCheck<I>
where
    I: Iterator<Item = Result<IntervalRecord, SafeHarborError>>,
{
    type Item = Result<IntervalRecord, SafeHarborError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.inner.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };
        let in_order = match &self.last {
            Some((chrom, start)) if *chrom == record.chrom => record.start >= *start,
            // a chromosome must not reappear after another has started
            _ => !self.seen.contains(&record.chrom),
        };
        if !in_order {
            return Some(Err(SafeHarborError::UnsortedInput(
                record.to_tsv(&BED_TSV),
            )));
        }
        self.seen.insert(record.chrom.clone());
        self.last = Some((record.chrom.clone(), record.start));
        Some(Ok(record))
    }
}

/// Remove from the ranges of `left` every basepair covered by `right`.
pub fn safeharbor_subtract(
    seqlens: &Path,
    left: &Path,
    right: &Path,
    output: Option<&Path>,
) -> Result<CommandOutput<()>, SafeHarborError> {
    let index = GenomeIndex::from_file(seqlens)?;
    let mut report = Report::new();
    let left_set = read_bed_set(left, &index, &mut report)?;
    let right_set = read_bed_set(right, &index, &mut report)?;
    left_set.subtract(&right_set).to_tsv(output)?;
    Ok(CommandOutput::new((), report))
}
