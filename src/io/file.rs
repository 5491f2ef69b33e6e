//! Input/Output file handling with [`InputFile`] and [`OutputFile`].
//!
//! These types abstract over reading/writing both plaintext and gzip-compressed
//! input/output.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::io::{self, BufWriter};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Check if a file is a gzipped by looking for the magic numbers.
///
/// Files shorter than two bytes (including empty files) are not gzipped.
fn is_gzipped_file(file_path: &Path) -> io::Result<bool> {
    let file = File::open(file_path)?;
    let mut buffer = Vec::with_capacity(2);
    file.take(2).read_to_end(&mut buffer)?;
    Ok(buffer == [0x1f, 0x8b])
}

/// An annotation, genome or manifest file to read, plaintext or gzipped.
#[derive(Clone, Debug)]
pub struct InputFile {
    pub filepath: PathBuf,
}

impl InputFile {
    /// Gzip-compressed input is detected from the file's magic bytes, not
    /// its extension.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    /// Opens the file and returns a buffered reader.
    ///
    /// If the file is gzip-compressed, this method will automatically handle
    /// the decompression.
    pub fn reader(&self) -> io::Result<BufReader<Box<dyn Read + Send>>> {
        let file = File::open(&self.filepath)?;
        let is_gzipped = is_gzipped_file(&self.filepath)?;
        let reader: Box<dyn Read + Send> = if is_gzipped {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }

    /// Read all lines of the file into memory.
    pub fn read_lines(&self) -> io::Result<Vec<String>> {
        self.reader()?.lines().collect()
    }
}

enum OutputDestination {
    File(PathBuf),
    Stdout,
}

/// Where BED and FASTA output goes: a file (gzipped if it ends in `.gz`) or
/// standard output.
pub struct OutputFile {
    destination: OutputDestination,
}

impl OutputFile {
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            destination: OutputDestination::File(filepath.into()),
        }
    }

    /// Constructs a new [`OutputFile`] for standard output.
    pub fn new_stdout() -> Self {
        Self {
            destination: OutputDestination::Stdout,
        }
    }

    /// Constructs an [`OutputFile`] for a path, or standard output if `None`.
    pub fn from_option(filepath: Option<&Path>) -> Self {
        match filepath {
            Some(path) => Self::new(path),
            None => Self::new_stdout(),
        }
    }

    /// Create the file, or wrap standard output, in a buffered writer.
    pub fn writer(&self) -> io::Result<Box<dyn Write>> {
        let writer: Box<dyn Write> = match &self.destination {
            OutputDestination::File(path) => {
                let is_gzip = path.extension().is_some_and(|ext| ext == "gz");
                if is_gzip {
                    Box::new(BufWriter::new(GzEncoder::new(
                        File::create(path)?,
                        Compression::default(),
                    )))
                } else {
                    Box::new(BufWriter::new(File::create(path)?))
                }
            }
            OutputDestination::Stdout => Box::new(BufWriter::new(io::stdout())),
        };
        Ok(writer)
    }
}
