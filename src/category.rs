//! Feature categories and how each category's source is normalized.
//!
//! Every [`Category`] has a default flank distance, a default source file
//! name, and a [`Normalization`]: the named strategy that turns the source's
//! raw lines into [`IntervalRecord`]s. Source-format quirks (feature-type
//! selection, attribute repair, header/footer rows, extra columns) live in the
//! strategy, not in the pipeline.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    error::SafeHarborError,
    io::parsers::{gtf::GtfRecord, parse_bedlike, parse_gtf},
    ranges::IntervalRecord,
    Position,
};

pub use crate::io::parsers::filters::RowWindow;

/// The GTF attribute used as the BED name column.
pub const NAME_ATTRIBUTE: &str = "transcript_id";

/// A class of genomic feature to keep safe harbors away from.
///
/// The declaration order is the order categories are processed, logged and
/// concatenated in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Genes,
    Oncogenes,
    Micrornas,
    Trnas,
    Lncrnas,
    Enhancers,
    Centromeres,
    Gaps,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 8] = [
        Category::Genes,
        Category::Oncogenes,
        Category::Micrornas,
        Category::Trnas,
        Category::Lncrnas,
        Category::Enhancers,
        Category::Centromeres,
        Category::Gaps,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Genes => "genes",
            Category::Oncogenes => "oncogenes",
            Category::Micrornas => "micrornas",
            Category::Trnas => "trnas",
            Category::Lncrnas => "lncrnas",
            Category::Enhancers => "enhancers",
            Category::Centromeres => "centromeres",
            Category::Gaps => "gaps",
        }
    }

    /// The default minimum distance, in bp, between a safe harbor and any
    /// feature of this category.
    pub fn default_flank(&self) -> Position {
        match self {
            Category::Genes => 50_000,
            Category::Oncogenes => 300_000,
            Category::Micrornas => 300_000,
            Category::Trnas => 150_000,
            Category::Lncrnas => 150_000,
            Category::Enhancers => 20_000,
            Category::Centromeres => 300_000,
            Category::Gaps => 300_000,
        }
    }

    /// The default source file name, relative to the data directory.
    pub fn default_source(&self) -> &'static str {
        match self {
            Category::Genes => "fixed_Danio_rerio.GRCz11.113.gtf",
            Category::Oncogenes => "zebrafish_oncogene_list.txt",
            Category::Micrornas => "dre-all.bed",
            Category::Trnas => "danRer11-tRNAs.gtf",
            Category::Lncrnas => "danRer11-lncRNA.gtf",
            Category::Enhancers => "hglft_genome_343af_45a580.bed",
            Category::Centromeres => "centromeres.txt",
            Category::Gaps => "gaps.txt",
        }
    }

    pub fn default_normalization(&self) -> Normalization {
        match self {
            Category::Genes => Normalization::gtf()
                .with_feature_filter(FeatureFilter::feature("gene"))
                .with_repair(NAME_ATTRIBUTE),
            Category::Oncogenes => Normalization::gtf()
                .with_repair(NAME_ATTRIBUTE)
                .intersected_with(Category::Genes),
            Category::Micrornas => Normalization::bed(),
            Category::Trnas => Normalization::gtf().with_repair(NAME_ATTRIBUTE),
            Category::Lncrnas => Normalization::gtf().with_repair(NAME_ATTRIBUTE),
            Category::Enhancers => Normalization::bed(),
            Category::Centromeres => Normalization::bed().with_row_window(RowWindow::KeepLast(3)),
            Category::Gaps => Normalization::bed()
                .with_row_window(RowWindow::KeepLast(2))
                .with_bed3_projection(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Category {
    type Err = SafeHarborError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.name() == lower)
            .ok_or_else(|| SafeHarborError::UnknownCategory(s.to_string()))
    }
}

/// The tabular format of a category source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// `chrom  start  end  ...`, 0-based right-exclusive.
    Bed,
    /// Nine-column GTF, 1-based closed.
    Gtf,
}

/// A named row filter on a GTF column, e.g. `feature == gene`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeatureFilter {
    /// Keep rows whose feature-type column equals this value.
    Feature(String),
}

impl FeatureFilter {
    pub fn feature(value: &str) -> Self {
        FeatureFilter::Feature(value.to_string())
    }

    pub fn matches(&self, record: &GtfRecord) -> bool {
        match self {
            FeatureFilter::Feature(value) => record.feature == *value,
        }
    }
}

impl std::fmt::Display for FeatureFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureFilter::Feature(value) => write!(f, "feature == {}", value),
        }
    }
}

/// How a category's raw source lines become [`IntervalRecord`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalization {
    pub format: SourceFormat,
    /// Applied to data rows before anything is parsed.
    pub row_window: RowWindow,
    /// GTF only: rows not matching are dropped before coordinate extraction.
    pub feature_filter: Option<FeatureFilter>,
    /// GTF only: this attribute is synthesized (empty) where missing.
    pub repair_attribute: Option<String>,
    /// Drop all columns after the third.
    pub bed3_projection: bool,
    /// Keep only records overlapping this category's normalized records.
    pub intersect_with: Option<Category>,
}

/// The result of normalizing a source.
#[derive(Debug, Default)]
pub struct NormalizedRecords {
    pub records: Vec<IntervalRecord>,
    /// Rows dropped as malformed.
    pub malformed: Vec<SafeHarborError>,
    /// GTF rows removed by the feature filter.
    pub filtered: usize,
    /// GTF rows with a synthesized attribute.
    pub repaired: usize,
}

impl Normalization {
    pub fn bed() -> Self {
        Self {
            format: SourceFormat::Bed,
            row_window: RowWindow::All,
            feature_filter: None,
            repair_attribute: None,
            bed3_projection: false,
            intersect_with: None,
        }
    }

    pub fn gtf() -> Self {
        Self {
            format: SourceFormat::Gtf,
            ..Self::bed()
        }
    }

    pub fn with_row_window(mut self, row_window: RowWindow) -> Self {
        self.row_window = row_window;
        self
    }

    pub fn with_feature_filter(mut self, filter: FeatureFilter) -> Self {
        self.feature_filter = Some(filter);
        self
    }

    pub fn with_repair(mut self, attribute: &str) -> Self {
        self.repair_attribute = Some(attribute.to_string());
        self
    }

    pub fn with_bed3_projection(mut self) -> Self {
        self.bed3_projection = true;
        self
    }

    pub fn intersected_with(mut self, category: Category) -> Self {
        self.intersect_with = Some(category);
        self
    }

    /// Normalize data lines (comments and blanks already removed).
    ///
    /// Malformed rows are collected rather than returned as an error, so the
    /// remaining rows are still usable.
    pub fn normalize(&self, lines: Vec<String>) -> NormalizedRecords {
        let mut normalized = NormalizedRecords::default();
        for line in self.row_window.apply(lines) {
            let result = match self.format {
                SourceFormat::Bed => parse_bedlike(&line).map(Some),
                SourceFormat::Gtf => self.normalize_gtf(&line, &mut normalized),
            };
            match result {
                Ok(Some(mut record)) => {
                    if self.bed3_projection {
                        record = record.into_bed3();
                    }
                    normalized.records.push(record);
                }
                Ok(None) => normalized.filtered += 1,
                Err(e) => normalized.malformed.push(e),
            }
        }
        normalized
    }

    fn normalize_gtf(
        &self,
        line: &str,
        normalized: &mut NormalizedRecords,
    ) -> Result<Option<IntervalRecord>, SafeHarborError> {
        let mut record = parse_gtf(line)?;
        if let Some(filter) = &self.feature_filter {
            if !filter.matches(&record) {
                return Ok(None);
            }
        }
        if let Some(attribute) = &self.repair_attribute {
            if record.ensure_attribute(attribute) {
                normalized.repaired += 1;
            }
        }
        record.into_bed(NAME_ATTRIBUTE).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_category_names_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.name().parse::<Category>().unwrap(), category);
        }
        assert_eq!("Genes".parse::<Category>().unwrap(), Category::Genes);
        assert!(matches!(
            "pseudogenes".parse::<Category>(),
            Err(SafeHarborError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_default_flanks() {
        let flanks: Vec<_> = Category::ALL.iter().map(|c| c.default_flank()).collect();
        assert_eq!(
            flanks,
            vec![50_000, 300_000, 300_000, 150_000, 150_000, 20_000, 300_000, 300_000]
        );
    }

    #[test]
    fn test_gene_normalization() {
        let source = lines(
            "1\tensembl\tgene\t101\t200\t.\t+\t.\tgene_id \"g1\";\n\
             1\tensembl\ttranscript\t101\t150\t.\t+\t.\tgene_id \"g1\"; transcript_id \"t1\";\n\
             1\tensembl\tgene\t301\t400\t.\t-\t.\tgene_id \"g2\"; transcript_id \"t2\";\n\
             1\tensembl\tgene\t5",
        );
        let normalized = Category::Genes.default_normalization().normalize(source);
        assert_eq!(normalized.filtered, 1);
        assert_eq!(normalized.repaired, 1);
        assert_eq!(normalized.malformed.len(), 1);
        assert_eq!(
            normalized.records,
            vec![
                IntervalRecord::new(
                    "1",
                    100,
                    200,
                    vec!["".to_string(), ".".to_string(), "+".to_string()]
                ),
                IntervalRecord::new(
                    "1",
                    300,
                    400,
                    vec!["t2".to_string(), ".".to_string(), "-".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_unrepaired_gtf_drops_missing_attribute() {
        let source = lines(
            "1\tucsc\texon\t1\t10\t0\t+\t.\tgene_id \"trna1\";\n\
             1\tucsc\texon\t21\t30\t0\t+\t.\tgene_id \"trna2\"; transcript_id \"trna2\";",
        );
        let normalized = Normalization::gtf().normalize(source);
        assert_eq!(normalized.malformed.len(), 1);
        assert_eq!(normalized.records.len(), 1);
        assert_eq!((normalized.records[0].start, normalized.records[0].end), (20, 30));
    }

    #[test]
    fn test_trna_and_oncogene_rows_without_name_are_kept() {
        let source = lines(
            "1\tucsc\texon\t1\t10\t0\t+\t.\tgene_id \"trna1\";\n\
             1\tucsc\texon\t21\t30\t0\t+\t.\tgene_id \"trna2\"; transcript_id \"trna2\";",
        );
        for category in [Category::Trnas, Category::Oncogenes] {
            let normalized = category.default_normalization().normalize(source.clone());
            assert!(normalized.malformed.is_empty(), "{}", category);
            assert_eq!(normalized.repaired, 1);
            let ranges: Vec<_> = normalized
                .records
                .iter()
                .map(|r| (r.start, r.end))
                .collect();
            assert_eq!(ranges, vec![(0, 10), (20, 30)]);
        }
    }

    #[test]
    fn test_gap_normalization() {
        // a SQL dump header row, then two data rows with extra columns
        let source = lines(
            "bin\tchrom\tchromStart\n\
             1\t100\t200\t1\tN\t100\tcontig\tno\n\
             1\t500\t600\t2\tN\t100\tcontig\tno",
        );
        let normalized = Category::Gaps.default_normalization().normalize(source);
        assert!(normalized.malformed.is_empty());
        assert_eq!(
            normalized.records,
            vec![
                IntervalRecord::new("1", 100, 200, vec![]),
                IntervalRecord::new("1", 500, 600, vec![]),
            ]
        );
    }

    #[test]
    fn test_centromere_normalization() {
        let source = lines("header one\nheader two\n1\t10\t20\n2\t10\t20\n3\t10\t20");
        let normalized = Category::Centromeres.default_normalization().normalize(source);
        assert!(normalized.malformed.is_empty());
        let chroms: Vec<_> = normalized.records.iter().map(|r| r.chrom.as_str()).collect();
        assert_eq!(chroms, vec!["1", "2", "3"]);
    }
}
