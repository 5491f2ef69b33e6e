//! GTF parsing.
//!
//! GTF rows have nine tab-separated columns:
//!
//! ```text
//! seqname  source  feature  start  end  score  strand  frame  attributes
//! ```
//!
//! with 1-based, fully-closed coordinates. [`parse_gtf()`] converts these to
//! the 0-based, right-exclusive convention used everywhere else, so a GTF row
//! with `start = 1, end = 10` becomes the range `[0, 10)`.

use crate::error::SafeHarborError;
use crate::ranges::IntervalRecord;
use crate::Position;

use super::utils::parse_column;

/// A parsed GTF row. Coordinates are already converted to 0-based,
/// right-exclusive form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GtfRecord {
    pub seqname: String,
    pub source: String,
    pub feature: String,
    pub start: Position,
    pub end: Position,
    pub score: String,
    pub strand: String,
    pub frame: String,
    pub attributes: String,
    line: String,
}

impl GtfRecord {
    /// The value of attribute `key`, with surrounding quotes removed.
    ///
    /// Attributes are `key "value";` pairs; unquoted values are accepted too.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .split(';')
            .filter_map(|pair| pair.trim().split_once(|c: char| c.is_whitespace()))
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.trim().trim_matches('"'))
    }

    /// Append `key ""` if attribute `key` is absent.
    ///
    /// Returns whether the record was repaired.
    pub fn ensure_attribute(&mut self, key: &str) -> bool {
        if self.attribute(key).is_some() {
            return false;
        }
        let trimmed = self.attributes.trim_end();
        let separator = if trimmed.is_empty() || trimmed.ends_with(';') {
            ""
        } else {
            ";"
        };
        let space = if trimmed.is_empty() { "" } else { " " };
        self.attributes = format!("{}{}{}{} \"\";", trimmed, separator, space, key);
        true
    }

    /// Convert to a BED6-like [`IntervalRecord`] whose fields are
    /// `[name, score, strand]`, with the name taken from attribute `name_key`.
    ///
    /// A row without that attribute is malformed.
    pub fn into_bed(self, name_key: &str) -> Result<IntervalRecord, SafeHarborError> {
        let name = match self.attribute(name_key) {
            Some(name) => name.to_string(),
            None => {
                return Err(SafeHarborError::malformed(
                    &self.line,
                    format!("missing attribute '{}'", name_key),
                ))
            }
        };
        Ok(IntervalRecord::new(
            &self.seqname,
            self.start,
            self.end,
            vec![name, self.score, self.strand],
        ))
    }
}

/// Parse a GTF line. At least eight columns are required; the attributes
/// column may be missing.
pub fn parse_gtf(line: &str) -> Result<GtfRecord, SafeHarborError> {
    let columns: Vec<&str> = line.splitn(9, '\t').collect();
    if columns.len() < 8 {
        return Err(SafeHarborError::malformed(
            line,
            format!("expected at least 8 GTF columns, found {}", columns.len()),
        ));
    }

    let seqname = columns[0].trim();
    if seqname.is_empty() {
        return Err(SafeHarborError::malformed(line, "empty sequence name"));
    }
    let gtf_start: Position = parse_column(columns[3], line)?;
    let gtf_end: Position = parse_column(columns[4], line)?;
    if gtf_start == 0 || gtf_end < gtf_start {
        return Err(SafeHarborError::malformed(
            line,
            format!("invalid 1-based range {}-{}", gtf_start, gtf_end),
        ));
    }

    Ok(GtfRecord {
        seqname: seqname.to_string(),
        source: columns[1].to_string(),
        feature: columns[2].to_string(),
        start: gtf_start - 1,
        end: gtf_end,
        score: columns[5].to_string(),
        strand: columns[6].to_string(),
        frame: columns[7].to_string(),
        attributes: columns.get(8).map(|s| s.to_string()).unwrap_or_default(),
        line: line.to_string(),
    })
}
