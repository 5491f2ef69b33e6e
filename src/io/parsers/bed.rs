//! BED-like file parsing.
//!
//! The BED (Browser Extensible Format) is a TSV format in bioinformatics.
//! It has a fairly strict [specification](https://samtools.github.io/hts-specs/BEDv1.pdf),
//! but in practice it is quite permissive, and in bioinformatics one encounters lots
//! of "BED-like" files. Here only the first three columns are interpreted; any
//! remaining columns are carried along as opaque fields.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::SafeHarborError;
use crate::io::InputFile;
use crate::ranges::IntervalRecord;
use crate::Position;

use super::utils::{is_metadata_line, parse_column};

pub const PARSE_CAPACITY: usize = 512;

/// A lazy parser for BED-like files, yielding one [`IntervalRecord`] per data
/// line. Metadata lines (comments, blanks, `track` lines) are skipped; lines that
/// fail to parse are yielded as errors so the caller can decide whether to
/// drop them or stop.
pub struct BedlikeIterator {
    reader: BufReader<Box<dyn Read + Send>>,
    line_buffer: String,
}

impl std::fmt::Debug for BedlikeIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedlikeIterator").finish_non_exhaustive()
    }
}

impl BedlikeIterator {
    /// Create a new lazy-parsing iterator over BED-like TSV data. This parser
    /// assumes the first three columns are the sequence name, start (0-indexed and inclusive),
    /// and end (0-indexed and exclusive) positions.
    pub fn new(filepath: impl AsRef<Path>) -> Result<Self, SafeHarborError> {
        let input_file = InputFile::new(filepath.as_ref());
        let reader = input_file.reader()?;
        let line_buffer = String::with_capacity(PARSE_CAPACITY);
        Ok(Self {
            reader,
            line_buffer,
        })
    }
}

impl Iterator for BedlikeIterator {
    type Item = Result<IntervalRecord, SafeHarborError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buffer.clear();
            match self.reader.read_line(&mut self.line_buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    if !is_metadata_line(&self.line_buffer) {
                        let line = self.line_buffer.trim_end();
                        return Some(parse_bedlike(line));
                    }
                }
                Err(e) => return Some(Err(SafeHarborError::IOError(e))),
            }
        }
    }
}

/// Parses a BED-like line into an [`IntervalRecord`], keeping any columns
/// after the third as fields.
pub fn parse_bedlike(line: &str) -> Result<IntervalRecord, SafeHarborError> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() < 3 {
        return Err(SafeHarborError::malformed(
            line,
            format!("expected at least 3 columns, found {}", columns.len()),
        ));
    }

    let seqname = columns[0].trim();
    if seqname.is_empty() {
        return Err(SafeHarborError::malformed(line, "empty sequence name"));
    }
    let start: Position = parse_column(columns[1], line)?;
    let end: Position = parse_column(columns[2], line)?;
    if start >= end {
        return Err(SafeHarborError::malformed(
            line,
            format!("start ({}) must be less than end ({})", start, end),
        ));
    }

    let fields = columns[3..].iter().map(|s| s.to_string()).collect();
    Ok(IntervalRecord::new(seqname, start, end, fields))
}
