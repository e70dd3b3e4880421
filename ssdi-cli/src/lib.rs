#![warn(missing_docs)]
//! SSDi Calculator CLI Library
//!
//! Command-line front end for the SSDi calculator: argument parsing, configuration
//! discovery, logging setup, input ingestion and result writing around the
//! `ssdi-stats` engine.
//!
//! # Example
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = ssdi_cli::run() {
//!         eprintln!("Error: {e:#}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod config;
mod executor;
mod ingest;
mod planner;

pub use config::*;
pub use executor::{
    build_report, build_report_meta, emit_diagnostics, format_human_output, run_analysis,
    write_outputs,
};
pub use ingest::{
    Ingested, InputFormat, RowDiagnostic, RowIssue, parse_row, read_records,
    read_records_from_path,
};
pub use planner::{AnalysisPlan, build_plan};

use anyhow::{Context, bail};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::ThreadPoolBuilder;
use regex::Regex;
use ssdi_report::{OutputFormat, RunSettings, SortOrder};
use ssdi_stats::{
    AnalysisConfig, AnalysisError, MIN_P_VALUE_DECIMALS, PermutationConfig, group_by_species,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// SSDi calculator arguments
#[derive(Parser, Debug)]
#[command(name = "ssdi-calculator")]
#[command(
    author,
    version,
    about = "Sexual size dimorphism index (SSDi) with a permutation test"
)]
pub struct Cli {
    /// Path to a text file containing the input data (species, sex, size)
    #[arg(short, long, required_unless_present = "print_config")]
    pub input: Option<PathBuf>,

    /// Format of the input file: tab or csv
    #[arg(short = 'f', long)]
    pub fileformat: Option<String>,

    /// Existing directory to write all output files
    #[arg(short, long, required_unless_present = "print_config")]
    pub outdir: Option<PathBuf>,

    /// Seed for reproducible permutation draws
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of permutation replicates per species
    #[arg(long)]
    pub replicates: Option<usize>,

    /// Significance level for classifying a species as dimorphic
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Only analyse species whose name matches this regex
    #[arg(long)]
    pub species: Option<String>,

    /// Result files to write: tsv, csv, json
    #[arg(long, value_delimiter = ',')]
    pub output_formats: Option<Vec<String>>,

    /// Row order of written results: species or input
    #[arg(long)]
    pub sort: Option<String>,

    /// Number of threads for parallel analysis
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0")]
    pub threads: usize,

    /// Configuration file (defaults to ssdi.toml found from the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only warnings and errors on the terminal, no progress bar or summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a commented default ssdi.toml and exit
    #[arg(long)]
    pub print_config: bool,
}

/// Settings resolved from configuration file and command-line flags
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Input file format
    pub input_format: InputFormat,
    /// Engine configuration
    pub analysis: AnalysisConfig,
    /// Seed for the master generator
    pub seed: Option<u64>,
    /// Optional species filter
    pub species_filter: Option<Regex>,
    /// Result formats to write
    pub formats: Vec<OutputFormat>,
    /// Row order of written results
    pub sort: SortOrder,
    /// Decimal places in written results
    pub decimals: usize,
    /// Base name of result files
    pub file_stem: String,
    /// Log file name inside the output directory
    pub log_file: String,
}

impl RunOptions {
    /// Layer command-line flags over file configuration
    pub fn resolve(cli: &Cli, config: &SsdiConfig) -> anyhow::Result<Self> {
        let input_format: InputFormat = match cli.fileformat.as_deref().or(config.input.format.as_deref()) {
            Some(f) => f.parse().map_err(anyhow::Error::msg)?,
            None => bail!("No input format given; pass -f tab or -f csv"),
        };

        let analysis = AnalysisConfig {
            permutation: PermutationConfig {
                replicates: cli.replicates.unwrap_or(config.analysis.replicates),
                parallel: config.analysis.parallel,
            },
            alpha: cli.alpha.unwrap_or(config.analysis.alpha),
            parallel_species: config.analysis.parallel,
        };
        analysis.validate()?;

        let species_filter = cli
            .species
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("Invalid --species pattern")?;

        let format_names = cli.output_formats.as_ref().unwrap_or(&config.output.formats);
        let mut formats = Vec::with_capacity(format_names.len());
        for name in format_names {
            let format: OutputFormat = name.parse().map_err(anyhow::Error::msg)?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            bail!("No output formats selected");
        }

        let sort: SortOrder = cli
            .sort
            .as_deref()
            .unwrap_or(config.output.sort.as_str())
            .parse()
            .map_err(anyhow::Error::msg)?;

        if config.output.decimals < MIN_P_VALUE_DECIMALS {
            bail!(
                "output.decimals must be at least {} (got {})",
                MIN_P_VALUE_DECIMALS,
                config.output.decimals
            );
        }

        Ok(Self {
            input_format,
            analysis,
            seed: cli.seed.or(config.analysis.seed),
            species_filter,
            formats,
            sort,
            decimals: config.output.decimals,
            file_stem: config.output.file_stem.clone(),
            log_file: config.output.log_file.clone(),
        })
    }
}

/// Run the SSDi calculator with arguments from the command line.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the SSDi calculator with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    if cli.print_config {
        print!("{}", SsdiConfig::default_toml());
        return Ok(());
    }

    let (Some(input), Some(outdir)) = (cli.input.as_deref(), cli.outdir.as_deref()) else {
        bail!("Both --input and --outdir are required");
    };
    if !input.is_file() {
        bail!("{} is not an existing file", input.display());
    }
    if !outdir.is_dir() {
        bail!("{} is not an existing directory", outdir.display());
    }

    // Explicit --config must load; a discovered ssdi.toml is best-effort
    let config = match &cli.config {
        Some(path) => SsdiConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SsdiConfig::discover().unwrap_or_default(),
    };
    let options = RunOptions::resolve(&cli, &config)?;

    init_logging(&cli, &outdir.join(&options.log_file))?;

    // Configure Rayon thread pool for species and replicate parallelism
    if cli.threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }

    analyze_file(&cli, &options, input, outdir)
}

fn analyze_file(
    cli: &Cli,
    options: &RunOptions,
    input: &Path,
    outdir: &Path,
) -> anyhow::Result<()> {
    let start = Instant::now();

    tracing::info!("SSDi Calculator v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Input file: {}", input.display());
    tracing::info!("Output directory: {}", outdir.display());

    let ingested = read_records_from_path(input, options.input_format)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    for diagnostic in &ingested.diagnostics {
        tracing::debug!("Skipping {}", diagnostic);
    }
    if !ingested.diagnostics.is_empty() {
        tracing::warn!(
            "Skipped {} row(s) that could not be read; rerun with --verbose for details",
            ingested.diagnostics.len()
        );
    }
    tracing::info!("Valid records: {}", ingested.records.len());

    let plan = build_plan(
        group_by_species(&ingested.records),
        options.species_filter.as_ref(),
    );
    if plan.filtered_out > 0 {
        tracing::info!("Species excluded by filter: {}", plan.filtered_out);
    }
    if plan.groups.is_empty() {
        return Err(AnalysisError::NothingToAnalyze.into());
    }

    tracing::info!("Species to analyze: {}", plan.groups.len());
    tracing::debug!("Species with >1 M and >1 F: {}", plan.tally.over_one);
    tracing::debug!("Species with >2 M and >2 F: {}", plan.tally.over_two);
    tracing::debug!("Species with >3 M and >3 F: {}", plan.tally.over_three);

    let threads_str = if cli.threads == 0 {
        "all".to_string()
    } else {
        cli.threads.to_string()
    };
    tracing::info!(
        "Running {} permutation replicates per species (threads: {})",
        options.analysis.permutation.replicates,
        threads_str
    );

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let analysis_start = Instant::now();
    let analyses = run_analysis(&plan.groups, &options.analysis, &mut rng, !cli.quiet)?;
    let analysis_ms = analysis_start.elapsed().as_secs_f64() * 1000.0;
    emit_diagnostics(&analyses);

    let meta = build_report_meta(
        Some(input),
        RunSettings {
            replicates: options.analysis.permutation.replicates,
            alpha: options.analysis.alpha,
            seed: options.seed,
            decimals: options.decimals,
        },
    );
    let report = build_report(
        &analyses,
        meta,
        options.sort,
        ingested.records.len(),
        ingested.diagnostics.len(),
        analysis_ms,
    );

    let written = write_outputs(
        &report,
        outdir,
        &options.file_stem,
        &options.formats,
        options.decimals,
    )?;
    for path in &written {
        tracing::info!("Results written to {}", path.display());
    }

    if !cli.quiet {
        println!("{}", format_human_output(&report));
    }

    tracing::info!("Elapsed time: {:.2} seconds", start.elapsed().as_secs_f64());
    Ok(())
}

/// Console logging on stderr plus a debug-level run log in the output directory
fn init_logging(cli: &Cli, log_path: &Path) -> anyhow::Result<()> {
    let console_filter = if cli.verbose {
        "ssdi=debug"
    } else if cli.quiet {
        "warn"
    } else {
        "ssdi=info"
    };

    let log_file = File::create(log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(console_filter));
    let file = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_filter(EnvFilter::new("ssdi=debug"));

    // A subscriber may already be installed when running embedded or under test
    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .ok();

    Ok(())
}
