//! sigbloom-gen: CLI tool for building Bloom filter artifacts from signature feeds.

use clap::{Parser, Subcommand};
use sigbloom::{BloomFilter, BuildConfig, Pipeline, RunMode, SizingStrategy};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sigbloom-gen")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Build Bloom filter artifacts from hash and domain feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the four filter artifacts from a signature directory
    Build {
        /// Signature directory (artifacts are written here)
        signatures: PathBuf,

        /// Extended mode: larger MD5 capacity, dedup against the production filter
        #[arg(long)]
        extended: bool,

        /// Plain-text domain list (standard mode only)
        #[arg(short, long)]
        domains: Option<PathBuf>,

        /// Sizing strategy: streaming or exact
        #[arg(short, long)]
        strategy: Option<SizingStrategy>,

        /// Target false positive rate
        #[arg(long)]
        fpp: Option<f64>,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Prior MD5 artifact (default: ../production/hypatia-md5-bloom.bin)
        #[arg(long)]
        prior: Option<PathBuf>,

        /// Write the run report as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the parameters of an artifact and optionally query it
    Inspect {
        /// Artifact file (plain or .gz)
        artifact: PathBuf,

        /// Values to test for membership
        #[arg(short, long)]
        query: Vec<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            signatures,
            extended,
            domains,
            strategy,
            fpp,
            config,
            prior,
            report,
            verbose,
        } => build(BuildArgs {
            signatures,
            extended,
            domains,
            strategy,
            fpp,
            config,
            prior,
            report,
            verbose,
        }),
        Commands::Inspect { artifact, query } => inspect(&artifact, &query),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct BuildArgs {
    signatures: PathBuf,
    extended: bool,
    domains: Option<PathBuf>,
    strategy: Option<SizingStrategy>,
    fpp: Option<f64>,
    config: Option<PathBuf>,
    prior: Option<PathBuf>,
    report: Option<PathBuf>,
    verbose: bool,
}

fn build(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => BuildConfig::load(path)?,
        None => BuildConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(fpp) = args.fpp {
        config.fpp = fpp;
    }
    config.validate()?;

    if args.verbose {
        println!("Configuration: {:?}", config);
    }

    let mut pipeline = Pipeline::new(&args.signatures, config);
    if args.extended {
        pipeline = pipeline.with_mode(RunMode::Extended);
    }
    if let Some(domains) = args.domains {
        pipeline = pipeline.with_domain_list(domains);
    }
    if let Some(prior) = args.prior {
        pipeline = pipeline.with_prior(prior);
    }

    let report = pipeline.run()?;

    if let Some(path) = &args.report {
        report.save(path)?;
        if args.verbose {
            println!("Wrote report {:?}", path);
        }
    }

    let written = report.artifacts.iter().filter(|a| a.error.is_none()).count();
    println!(
        "Built {} filters in {} mode: {} of {} artifacts written to {:?}",
        report.strategy,
        report.mode,
        written,
        report.artifacts.len(),
        args.signatures
    );
    if !report.exclusion_hits.is_empty() {
        println!(
            "Warning: {} excluded hashes test positive, review the log",
            report.exclusion_hits.len()
        );
    }
    Ok(())
}

fn inspect(artifact: &Path, queries: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let filter = BloomFilter::open(artifact)?;

    println!("Artifact: {:?}", artifact);
    println!("  bits: {}", filter.bit_size());
    println!("  hash functions: {}", filter.num_hash_functions());
    println!("  bits set: {}", filter.bit_count());
    println!("  approximate count: {}", filter.approximate_element_count());
    println!("  expected fpp: {:e}", filter.expected_fpp());

    for query in queries {
        let value = sigbloom::normalize(query);
        let verdict = if filter.might_contain(&value) {
            "probably present"
        } else {
            "absent"
        };
        println!("  {}: {}", value, verdict);
    }
    Ok(())
}
