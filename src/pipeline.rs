//! The safe harbor pipeline.
//!
//! A run has a fan-out/fan-in shape:
//!
//!  1. Load the whole-genome set.
//!  2. Run one branch per category (in parallel): parse and normalize the
//!     source, optionally keep only records overlapping another category's
//!     annotation, project to three columns, slop by the category's flank and
//!     sort-merge.
//!  3. Concatenate the branch outputs in category order.
//!  4. Sort-merge the concatenation into the excluded set.
//!  5. Subtract the excluded set from the whole genome.
//!  6. Drop alternate and unplaced contigs.
//!  7. Sort into the final safe harbor set.
//!
//! A branch never fails the run. Each branch ends in a [`CategoryOutcome`],
//! which keeps a disabled category, a skipped one (source file absent), a
//! failed one, and one processed with a 0 bp flank distinguishable.

use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::path::PathBuf;

use crate::{
    category::{Category, NormalizedRecords},
    config::{CategorySettings, PipelineConfig, PipelineOptions, WholeGenomeSource},
    error::SafeHarborError,
    genome::GenomeIndex,
    intervals::IntervalSet,
    io::{parsers::read_data_lines, InputFile},
    Position,
};

/// How a category branch ended.
#[derive(Debug)]
pub enum CategoryOutcome {
    /// Turned off in the configuration.
    Disabled,
    /// The source file does not exist, so the category contributes nothing.
    Skipped { path: PathBuf },
    /// The branch stopped with an error, e.g. an unknown chromosome.
    Failed { error: SafeHarborError },
    /// The branch produced a flanked, merged set.
    Processed(BranchSummary),
}

impl CategoryOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, CategoryOutcome::Processed(_))
    }
}

/// Counts describing a processed branch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BranchSummary {
    pub flank: Position,
    /// Records kept after normalization (and intersection, if any).
    pub records: usize,
    /// Rows dropped as malformed.
    pub malformed: usize,
    /// Rows with a synthesized attribute.
    pub repaired: usize,
    /// Ranges after slop and merge.
    pub merged_ranges: usize,
    /// Basepairs covered after slop and merge.
    pub covered_bp: u64,
}

/// A category's parsed source, before flanking.
#[derive(Clone, Debug)]
pub struct LoadedSource {
    pub set: IntervalSet,
    pub malformed: usize,
    pub repaired: usize,
}

/// What the pipeline produces.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The union of all flanked category regions, merged.
    pub excluded: IntervalSet,
    /// The whole genome minus the excluded set, before contig filtering.
    pub unfiltered: IntervalSet,
    /// The final safe harbor set.
    pub safe_harbors: IntervalSet,
    /// Every category's outcome, in category order.
    pub outcomes: Vec<(Category, CategoryOutcome)>,
}

impl PipelineOutput {
    pub fn outcome(&self, category: Category) -> Option<&CategoryOutcome> {
        self.outcomes
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, outcome)| outcome)
    }
}

/// A category annotation other branches intersect against.
enum Reference {
    Loaded(LoadedSource),
    Missing(PathBuf),
    Failed(String),
}

/// The orchestrator. The [`GenomeIndex`] and configuration are read-only
/// for the whole run and shared by all branches.
#[derive(Clone, Debug)]
pub struct SafeHarborPipeline {
    index: GenomeIndex,
    config: PipelineConfig,
    options: PipelineOptions,
}

impl SafeHarborPipeline {
    pub fn new(index: GenomeIndex, config: PipelineConfig) -> Self {
        Self {
            index,
            config,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn index(&self) -> &GenomeIndex {
        &self.index
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline.
    pub fn run(&self) -> Result<PipelineOutput, SafeHarborError> {
        let whole_genome = match &self.options.whole_genome {
            WholeGenomeSource::FromIndex => self.index.whole_genome()?,
            WholeGenomeSource::Bed(path) => self.index.read_whole_genome_bed(path)?,
        };

        let references = self.load_references();

        let results: Vec<(Category, CategoryOutcome, Option<IntervalSet>)> = Category::ALL
            .par_iter()
            .map(|&category| {
                let (outcome, set) = self.run_branch(category, &references);
                (category, outcome, set)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(results.len());
        let mut sets = Vec::new();
        for (category, outcome, set) in results {
            if let Some(set) = set {
                self.write_intermediate(&format!("{}_with_flanks_merged.bed", category), &set)?;
                sets.push(set);
            }
            outcomes.push((category, outcome));
        }

        let excluded = IntervalSet::concat(&self.index, sets)?.sort_merge();
        info!(
            "excluded set: {} ranges covering {} bp",
            excluded.len(),
            excluded.total_width()
        );
        self.write_intermediate("regions_to_avoid_merged.bed", &excluded)?;

        let unfiltered = whole_genome.subtract(&excluded);
        self.write_intermediate("safe_harbors_with_alt.bed", &unfiltered)?;

        let filtered = if self.options.exclude_contigs {
            unfiltered.clone().exclude_contigs()?
        } else {
            unfiltered.clone()
        };
        let safe_harbors = filtered.sort();
        info!(
            "safe harbors: {} ranges covering {} bp",
            safe_harbors.len(),
            safe_harbors.total_width()
        );
        self.write_intermediate("safe_harbors.bed", &safe_harbors)?;

        Ok(PipelineOutput {
            excluded,
            unfiltered,
            safe_harbors,
            outcomes,
        })
    }

    /// Load the annotations that enabled categories intersect against. Each
    /// is loaded once, whether or not its own category is enabled.
    fn load_references(&self) -> Vec<(Category, Reference)> {
        let mut references: Vec<(Category, Reference)> = Vec::new();
        for (_, settings) in self.config.iter().filter(|(_, s)| s.enabled) {
            let Some(reference) = settings.normalization.intersect_with else {
                continue;
            };
            if references.iter().any(|(c, _)| *c == reference) {
                continue;
            }
            let reference_settings = self.config.get(reference);
            let loaded = if !reference_settings.source.is_file() {
                Reference::Missing(reference_settings.source.clone())
            } else {
                match self.load_source(reference, reference_settings) {
                    Ok(loaded) => Reference::Loaded(loaded),
                    Err(e) => Reference::Failed(e.to_string()),
                }
            };
            references.push((reference, loaded));
        }
        references
    }

    /// Parse and normalize a category's source into a raw set over the index.
    ///
    /// Malformed rows are dropped and counted. A record on a chromosome not in
    /// the index is an error.
    pub fn load_source(
        &self,
        category: Category,
        settings: &CategorySettings,
    ) -> Result<LoadedSource, SafeHarborError> {
        let lines = read_data_lines(&InputFile::new(&settings.source))?;
        let NormalizedRecords {
            records,
            malformed,
            filtered,
            repaired,
        } = settings.normalization.normalize(lines);

        if !malformed.is_empty() {
            warn!(
                "{}: dropped {} malformed row(s) from {}",
                category,
                malformed.len(),
                settings.source.display()
            );
            for e in malformed.iter().take(3) {
                debug!("{}: {}", category, e);
            }
        }
        if filtered > 0 {
            debug!("{}: {} row(s) removed by the feature filter", category, filtered);
        }
        if repaired > 0 {
            debug!("{}: synthesized a missing attribute on {} row(s)", category, repaired);
        }

        let set = IntervalSet::from_records(&self.index, records)?;
        Ok(LoadedSource {
            set,
            malformed: malformed.len(),
            repaired,
        })
    }

    fn run_branch(
        &self,
        category: Category,
        references: &[(Category, Reference)],
    ) -> (CategoryOutcome, Option<IntervalSet>) {
        let settings = self.config.get(category);
        if !settings.enabled {
            info!("{}: disabled", category);
            return (CategoryOutcome::Disabled, None);
        }
        if !settings.source.is_file() {
            warn!(
                "{}: source {} not found, skipping category",
                category,
                settings.source.display()
            );
            return (
                CategoryOutcome::Skipped {
                    path: settings.source.clone(),
                },
                None,
            );
        }

        let reference = settings
            .normalization
            .intersect_with
            .and_then(|r| references.iter().find(|(c, _)| *c == r));

        if let Some((reference_category, Reference::Missing(path))) = reference {
            warn!(
                "{}: {} annotation {} not found, skipping category",
                category,
                reference_category,
                path.display()
            );
            return (CategoryOutcome::Skipped { path: path.clone() }, None);
        }

        match self.flank_category(category, settings, references, reference) {
            Ok((summary, set)) => {
                info!(
                    "{}: distance = {} bp, {} record(s) merged into {} range(s)",
                    category, summary.flank, summary.records, summary.merged_ranges
                );
                (CategoryOutcome::Processed(summary), Some(set))
            }
            Err(e) => {
                let error = e.in_category(category);
                error!("{}", error);
                (CategoryOutcome::Failed { error }, None)
            }
        }
    }

    fn flank_category(
        &self,
        category: Category,
        settings: &CategorySettings,
        references: &[(Category, Reference)],
        reference: Option<&(Category, Reference)>,
    ) -> Result<(BranchSummary, IntervalSet), SafeHarborError> {
        // a category that is itself a reference has already been loaded
        let preloaded = references.iter().find_map(|(c, r)| match r {
            Reference::Loaded(loaded) if *c == category => Some(loaded.clone()),
            _ => None,
        });
        let loaded = match preloaded {
            Some(loaded) => loaded,
            None => self.load_source(category, settings)?,
        };

        let set = match reference {
            Some((_, Reference::Loaded(annotation))) => {
                loaded.set.filter_overlaps(&annotation.set)?
            }
            Some((reference, Reference::Failed(reason))) => {
                return Err(SafeHarborError::ReferenceUnavailable {
                    category,
                    reference: *reference,
                    reason: reason.clone(),
                })
            }
            _ => loaded.set,
        };

        let records = set.len();
        let merged = set
            .to_bed3()
            .slop(settings.flank, &self.index)?
            .sort_merge();
        let summary = BranchSummary {
            flank: settings.flank,
            records,
            malformed: loaded.malformed,
            repaired: loaded.repaired,
            merged_ranges: merged.len(),
            covered_bp: merged.total_width(),
        };
        Ok((summary, merged))
    }

    fn write_intermediate(&self, name: &str, set: &IntervalSet) -> Result<(), SafeHarborError> {
        if let Some(dir) = &self.options.intermediates_dir {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(name);
            debug!("writing {}", path.display());
            set.to_tsv(Some(path.as_path()))?;
        }
        Ok(())
    }
}
