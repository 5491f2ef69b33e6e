use crate::{error::SafeHarborError, io::InputFile};

/// Parse a single column, reporting the full line as malformed if the
/// value cannot be parsed into `T`.
pub fn parse_column<T: std::str::FromStr>(column: &str, line: &str) -> Result<T, SafeHarborError> {
    column.trim().parse::<T>().map_err(|_| {
        SafeHarborError::malformed(
            line,
            format!(
                "could not parse '{}' as {}",
                column,
                std::any::type_name::<T>()
            ),
        )
    })
}

/// Whether a line carries no data: blank, a `#` comment, or a UCSC
/// `track`/`browser` line.
pub fn is_metadata_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("track ")
        || trimmed.starts_with("browser ")
}

/// Read the data lines of a file, with trailing whitespace (including
/// Windows line endings) removed and metadata lines skipped.
pub fn read_data_lines(input: &InputFile) -> Result<Vec<String>, SafeHarborError> {
    Ok(input
        .read_lines()?
        .into_iter()
        .filter(|line| !is_metadata_line(line))
        .map(|line| line.trim_end().to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utilities::temp_file_with, Position};

    #[test]
    fn test_parse_column() {
        let value: Position = parse_column("42", "chr1\t42\t50").unwrap();
        assert_eq!(value, 42);
        let result: Result<Position, _> = parse_column("-1", "chr1\t-1\t50");
        assert!(matches!(result, Err(SafeHarborError::MalformedRecord { .. })));
    }

    #[test]
    fn test_read_data_lines() {
        let file = temp_file_with("#header\ntrack name=x\n\nchr1\t0\t10\r\n  \nchr2\t5\t6\n");
        let lines = read_data_lines(&InputFile::new(file.path())).unwrap();
        assert_eq!(lines, vec!["chr1\t0\t10", "chr2\t5\t6"]);
    }
}
