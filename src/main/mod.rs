use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use safeharbor::{
    commands::{
        safeharbor_merge, safeharbor_predict, safeharbor_slop, safeharbor_subtract,
        PredictOutputs,
    },
    config::WholeGenomeSource,
    prelude::*,
    reporting::Report,
};

const INFO: &str = "\
safeharbor: predict genomic safe harbor regions
usage: safeharbor [--help] <subcommand>

Subcommands:

  predict: run the full pipeline, writing the regions far from every
           annotated feature.
  slop: expand each range of a BED file by a number of basepairs.
  merge: merge overlapping and touching ranges of a BED file.
  subtract: remove the basepairs covered by one BED file from another.

";

#[derive(Parser)]
#[clap(name = "safeharbor")]
#[clap(about = INFO)]
struct Cli {
    /// increase logging verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// number of threads for the category branches (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Per-category flank distances, overriding the defaults.
#[derive(Args)]
struct FlankArgs {
    /// minimum distance (bp) from genes
    #[arg(long)]
    dist_from_genes: Option<Position>,

    /// minimum distance (bp) from oncogenes
    #[arg(long)]
    dist_from_oncogenes: Option<Position>,

    /// minimum distance (bp) from microRNAs
    #[arg(long)]
    dist_from_micrornas: Option<Position>,

    /// minimum distance (bp) from tRNAs
    #[arg(long)]
    dist_from_trnas: Option<Position>,

    /// minimum distance (bp) from lncRNAs
    #[arg(long)]
    dist_from_lncrnas: Option<Position>,

    /// minimum distance (bp) from enhancers
    #[arg(long)]
    dist_from_enhancers: Option<Position>,

    /// minimum distance (bp) from centromeres
    #[arg(long)]
    dist_from_centromeres: Option<Position>,

    /// minimum distance (bp) from assembly gaps
    #[arg(long)]
    dist_from_gaps: Option<Position>,
}

impl FlankArgs {
    fn overrides(&self) -> [(Category, Option<Position>); 8] {
        [
            (Category::Genes, self.dist_from_genes),
            (Category::Oncogenes, self.dist_from_oncogenes),
            (Category::Micrornas, self.dist_from_micrornas),
            (Category::Trnas, self.dist_from_trnas),
            (Category::Lncrnas, self.dist_from_lncrnas),
            (Category::Enhancers, self.dist_from_enhancers),
            (Category::Centromeres, self.dist_from_centromeres),
            (Category::Gaps, self.dist_from_gaps),
        ]
    }
}

#[derive(Subcommand)]
enum Commands {
    Predict {
        /// a TSV genome file of chromosome names and their lengths
        #[arg(long, required = true)]
        seqlens: PathBuf,

        /// directory the category source files are read from
        #[arg(long, default_value = safeharbor::config::DEFAULT_DATA_DIR)]
        data_dir: PathBuf,

        /// a TSV manifest of `category enabled flank source` rows
        #[arg(long)]
        manifest: Option<PathBuf>,

        #[command(flatten)]
        flanks: FlankArgs,

        /// a category to leave out (may be repeated)
        #[arg(long, value_enum)]
        skip: Vec<Category>,

        /// a BED file of whole chromosomes to use instead of the genome file
        #[arg(long)]
        whole_genome: Option<PathBuf>,

        /// write each stage's regions as BED files to this directory
        #[arg(long)]
        intermediates: Option<PathBuf>,

        /// keep alternate and unplaced contigs in the final output
        #[arg(long)]
        keep_contigs: bool,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// an optional output file for the merged excluded regions
        #[arg(long)]
        excluded: Option<PathBuf>,

        /// an indexed FASTA reference to extract safe harbor sequences from
        #[arg(long, requires = "sequences_output")]
        fasta: Option<PathBuf>,

        /// the FASTA file safe harbor sequences are written to
        #[arg(long, requires = "fasta")]
        sequences_output: Option<PathBuf>,
    },
    Slop {
        /// a TSV genome file of chromosome names and their lengths
        #[arg(long, required = true)]
        seqlens: PathBuf,

        /// an input BED-like TSV file
        #[arg(required = true)]
        bedfile: PathBuf,

        /// number of basepairs to expand the range start and end positions by
        #[arg(long)]
        both: Position,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// sort and merge the ranges after expanding them
        #[arg(long)]
        merge: bool,
    },
    Merge {
        /// a TSV genome file; if given, the input need not be sorted
        #[arg(long)]
        seqlens: Option<PathBuf>,

        /// an input BED-like TSV file
        #[arg(required = true)]
        bedfile: PathBuf,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Subtract {
        /// a TSV genome file of chromosome names and their lengths
        #[arg(long, required = true)]
        seqlens: PathBuf,

        /// the "left" BED-like TSV file
        #[arg(long, required = true)]
        left: PathBuf,

        /// the "right" BED-like TSV file
        #[arg(long, required = true)]
        right: PathBuf,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run() -> Result<Report, SafeHarborError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(threads) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            log::warn!("could not configure the thread pool: {}", e);
        }
    }

    let report = match &cli.command {
        Some(Commands::Predict {
            seqlens,
            data_dir,
            manifest,
            flanks,
            skip,
            whole_genome,
            intermediates,
            keep_contigs,
            output,
            excluded,
            fasta,
            sequences_output,
        }) => {
            let mut config = PipelineConfig::with_data_dir(data_dir);
            if let Some(manifest) = manifest {
                config.apply_manifest(manifest)?;
            }
            for (category, flank) in flanks.overrides() {
                if let Some(flank) = flank {
                    config.set_flank(category, flank);
                }
            }
            for category in skip {
                config.set_enabled(*category, false);
            }

            let options = PipelineOptions {
                whole_genome: whole_genome
                    .as_ref()
                    .map_or(WholeGenomeSource::FromIndex, |path| {
                        WholeGenomeSource::Bed(path.clone())
                    }),
                intermediates_dir: intermediates.clone(),
                exclude_contigs: !keep_contigs,
            };
            let outputs = PredictOutputs {
                safe_harbors: output.as_deref(),
                excluded: excluded.as_deref(),
                sequences: fasta.as_deref().zip(sequences_output.as_deref()),
            };
            let (_, report) = safeharbor_predict(seqlens, config, options, &outputs)?.into_parts();
            report
        }
        Some(Commands::Slop {
            seqlens,
            bedfile,
            both,
            output,
            merge,
        }) => safeharbor_slop(seqlens, bedfile, *both, output.as_deref(), *merge)?
            .into_parts()
            .1,
        Some(Commands::Merge {
            seqlens,
            bedfile,
            output,
        }) => safeharbor_merge(seqlens.as_deref(), bedfile, output.as_deref())?
            .into_parts()
            .1,
        Some(Commands::Subtract {
            seqlens,
            left,
            right,
            output,
        }) => safeharbor_subtract(seqlens, left, right, output.as_deref())?
            .into_parts()
            .1,
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    };
    Ok(report)
}

fn main() {
    match run() {
        Ok(report) => {
            if !report.is_empty() {
                eprint!("{}", report);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
