//! Pipeline configuration: per-category settings and run options.
//!
//! Every category's enable flag, flank distance, source path and
//! normalization are explicit values in a [`PipelineConfig`]. Defaults come
//! from [`Category`], and can be overridden with the setters, or in bulk by a
//! tab-separated manifest file:
//!
//! ```text
//! # category  enabled  flank   source
//! genes       true     50000   Danio_rerio.GRCz11.113.gtf.gz
//! enhancers   false    20000   .
//! ```
//!
//! A source of `.` (or an empty column) keeps the current path. Relative
//! paths are resolved against the configuration's data directory.

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::{
    category::{Category, Normalization},
    error::SafeHarborError,
    io::InputFile,
    Position,
};

/// The default data directory, as laid out by the download steps.
pub const DEFAULT_DATA_DIR: &str = "data";

/// The settings of one category branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySettings {
    pub enabled: bool,
    /// Minimum distance, in bp, between a safe harbor and any feature.
    pub flank: Position,
    pub source: PathBuf,
    pub normalization: Normalization,
}

impl CategorySettings {
    pub fn default_for(category: Category, data_dir: &Path) -> Self {
        Self {
            enabled: true,
            flank: category.default_flank(),
            source: data_dir.join(category.default_source()),
            normalization: category.default_normalization(),
        }
    }
}

/// Settings for every category, held in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    data_dir: PathBuf,
    settings: [CategorySettings; 8],
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR)
    }
}

impl PipelineConfig {
    /// Default settings with sources resolved against `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let settings = Category::ALL.map(|category| CategorySettings::default_for(category, &data_dir));
        Self { data_dir, settings }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn get(&self, category: Category) -> &CategorySettings {
        &self.settings[category as usize]
    }

    fn get_mut(&mut self, category: Category) -> &mut CategorySettings {
        &mut self.settings[category as usize]
    }

    /// Iterate over all categories and their settings, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategorySettings)> {
        Category::ALL.into_iter().zip(self.settings.iter())
    }

    pub fn enabled_categories(&self) -> Vec<Category> {
        self.iter()
            .filter(|(_, settings)| settings.enabled)
            .map(|(category, _)| category)
            .collect()
    }

    pub fn set_enabled(&mut self, category: Category, enabled: bool) -> &mut Self {
        self.get_mut(category).enabled = enabled;
        self
    }

    pub fn set_flank(&mut self, category: Category, flank: Position) -> &mut Self {
        self.get_mut(category).flank = flank;
        self
    }

    /// Set the source path of a category. Relative paths are resolved
    /// against the data directory.
    pub fn set_source(&mut self, category: Category, source: impl AsRef<Path>) -> &mut Self {
        let source = self.resolve(source.as_ref());
        self.get_mut(category).source = source;
        self
    }

    pub fn set_normalization(
        &mut self,
        category: Category,
        normalization: Normalization,
    ) -> &mut Self {
        self.get_mut(category).normalization = normalization;
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    /// Apply the rows of a manifest file on top of the current settings.
    ///
    /// Categories not listed keep their settings. Returns the categories the
    /// manifest changed, in file order.
    pub fn apply_manifest(
        &mut self,
        filepath: impl AsRef<Path>,
    ) -> Result<Vec<Category>, SafeHarborError> {
        let input_file = InputFile::new(filepath.as_ref());
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(input_file.reader()?);

        let mut changed = Vec::new();
        for result in reader.deserialize() {
            let row: ManifestRow = result?;
            self.set_enabled(row.category, row.enabled)
                .set_flank(row.category, row.flank);
            if let Some(source) = row.source {
                self.set_source(row.category, source);
            }
            changed.push(row.category);
        }
        Ok(changed)
    }
}

/// One row of a manifest file.
#[derive(Debug, Deserialize)]
struct ManifestRow {
    category: Category,
    enabled: bool,
    flank: Position,
    #[serde(deserialize_with = "deserialize_missing_source")]
    source: Option<String>,
}

/// Deserializes a source column where `.` or an empty value means "keep the
/// current source".
fn deserialize_missing_source<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    if value.is_empty() || value == "." {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

/// Where the whole-genome set comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum WholeGenomeSource {
    /// One `[0, length)` range per chromosome of the genome index.
    #[default]
    FromIndex,
    /// A BED file of `chrom  0  length` rows.
    Bed(PathBuf),
}

/// Options for a pipeline run that are not per-category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    pub whole_genome: WholeGenomeSource,
    /// If set, each stage's set is written here as BED for inspection.
    pub intermediates_dir: Option<PathBuf>,
    /// Drop alternate and unplaced contigs from the final safe harbors.
    pub exclude_contigs: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            whole_genome: WholeGenomeSource::FromIndex,
            intermediates_dir: None,
            exclude_contigs: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::temp_file_with;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.enabled_categories(), Category::ALL.to_vec());
        let genes = config.get(Category::Genes);
        assert_eq!(genes.flank, 50_000);
        assert_eq!(
            genes.source,
            PathBuf::from("data/fixed_Danio_rerio.GRCz11.113.gtf")
        );
        let order: Vec<_> = config.iter().map(|(category, _)| category).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn test_setters() {
        let mut config = PipelineConfig::with_data_dir("/srv/danrer11");
        config
            .set_enabled(Category::Enhancers, false)
            .set_flank(Category::Gaps, 0)
            .set_source(Category::Trnas, "trnas.gtf");
        assert!(!config.get(Category::Enhancers).enabled);
        assert_eq!(config.get(Category::Gaps).flank, 0);
        assert_eq!(
            config.get(Category::Trnas).source,
            PathBuf::from("/srv/danrer11/trnas.gtf")
        );
        config.set_source(Category::Trnas, "/tmp/trnas.gtf");
        assert_eq!(
            config.get(Category::Trnas).source,
            PathBuf::from("/tmp/trnas.gtf")
        );
        assert_eq!(config.enabled_categories().len(), 7);
    }

    #[test]
    fn test_manifest() {
        let manifest = temp_file_with(
            "# category\tenabled\tflank\tsource\n\
             genes\ttrue\t1000\tgenes.gtf\n\
             enhancers\tfalse\t20000\t.\n\
             gaps\ttrue\t0\t\n",
        );
        let mut config = PipelineConfig::with_data_dir("/data");
        let changed = config.apply_manifest(manifest.path()).unwrap();
        assert_eq!(
            changed,
            vec![Category::Genes, Category::Enhancers, Category::Gaps]
        );
        assert_eq!(config.get(Category::Genes).flank, 1000);
        assert_eq!(config.get(Category::Genes).source, PathBuf::from("/data/genes.gtf"));
        assert!(!config.get(Category::Enhancers).enabled);
        assert_eq!(
            config.get(Category::Enhancers).source,
            PathBuf::from("/data/hglft_genome_343af_45a580.bed")
        );
        assert_eq!(config.get(Category::Gaps).flank, 0);
        assert_eq!(config.get(Category::Gaps).source, PathBuf::from("/data/gaps.txt"));
    }

    #[test]
    fn test_manifest_unknown_category() {
        let manifest = temp_file_with("pseudogenes\ttrue\t1000\t.\n");
        let mut config = PipelineConfig::default();
        assert!(matches!(
            config.apply_manifest(manifest.path()),
            Err(SafeHarborError::CsvError(_))
        ));
    }
}
