use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "nmsa")]
#[command(about = "nmsa - exact N-ary sum-of-pairs alignment scoring")]
#[command(version)]
#[command(long_about = "
nmsa computes the optimal sum-of-pairs score of a multiple alignment of
nucleotide sequences by exhaustive dynamic programming over every column mask.
Work grows as 2^N per cell, so it is meant for a handful of short sequences.

Examples:
  nmsa align AATTATGG ACATTGTTG GCCAGGAGG AATTTTGAGG
  nmsa align --fasta reads.fa --strategy parallel --json
  nmsa evaluate --fasta aligned.fa
  nmsa config --example --output nmsa.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the optimal alignment score of a set of sequences
    Align {
        /// Sequences to align; characters other than A, C, G, T are gaps
        sequences: Vec<String>,

        /// Read additional sequences from a FASTA/FASTQ file
        #[arg(long)]
        fasta: Option<PathBuf>,

        /// Evaluation strategy
        #[arg(long)]
        strategy: Option<StrategyType>,

        /// Boundary treatment
        #[arg(long)]
        boundary: Option<BoundaryType>,

        /// Memo table layout (recursive strategy only)
        #[arg(long)]
        layout: Option<LayoutType>,

        /// Maximum dense table cells
        #[arg(long)]
        max_cells: Option<usize>,

        /// Maximum evaluated cursor tuples
        #[arg(long)]
        max_evaluations: Option<u64>,

        /// Print the full solve report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score an existing gapped alignment
    Evaluate {
        /// Aligned FASTA file; rows must have equal length, '-' is a gap
        #[arg(long, required = true)]
        fasta: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Print the default configuration instead of the loaded one
        #[arg(long)]
        example: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StrategyType {
    Recursive,
    Iterative,
    Parallel,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BoundaryType {
    FreeEnds,
    Global,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LayoutType {
    Dense,
    Sparse,
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    if quiet {
        std::env::set_var("RUST_LOG", "error");
    } else {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.quiet)?;

    let config = Config::load(cli.config.as_deref())
        .map_err(|e| CliError::config(format!("{:#}", e)))?;

    let threads = cli.threads.unwrap_or(config.general.threads);
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to set thread count")?;
    }

    match cli.command {
        Commands::Align {
            sequences,
            fasta,
            strategy,
            boundary,
            layout,
            max_cells,
            max_evaluations,
            json,
        } => {
            commands::align::execute(
                &config,
                sequences,
                fasta,
                strategy,
                boundary,
                layout,
                max_cells,
                max_evaluations,
                json,
            )?;
        }

        Commands::Evaluate { fasta, json } => {
            commands::evaluate::execute(&config, fasta, json)?;
        }

        Commands::Config { example, output } => {
            commands::config::execute(&config, example, output)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => print_error_and_exit(cli_err),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}
