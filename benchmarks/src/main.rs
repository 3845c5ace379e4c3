extern crate clap;
use std::{env, error::Error, path::PathBuf};

use benchmarks::experiment::{run_cardinality, run_similarity, run_sketch, Settings};
use clap::{ArgAction, Args, Parser, Subcommand};

const DEFAULT_PRECISION: u8 = 16;
const DEFAULT_BATCH_SIZE: usize = jaccard::DEFAULT_BATCH_SIZE;
const DEFAULT_DUPLICATES: f32 = 0.0;
const DEFAULT_RUNS: usize = 5;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare estimated and actual cardinalities of generated datasets
    Cardinality {
        /// Number of records per dataset
        #[clap(long, value_parser)]
        size: usize,

        /// Number of datasets
        #[clap(short, long, value_parser, default_value_t=DEFAULT_RUNS)]
        runs: usize,

        #[clap(flatten)]
        common: CommonArgs,
    },

    /// Estimate the similarity between a generated dataset and a copy sharing part of its rows
    Similarity {
        /// Share of the destination rows copied from the origin
        #[clap(short, long, value_parser)]
        similarity: f32,

        /// Number of origin rows
        #[clap(long, value_parser)]
        origin_rows: usize,

        /// Number of destination rows
        #[clap(long, value_parser)]
        dest_rows: usize,

        /// Write both datasets to disk and build the summaries from the files
        #[clap(long, action = ArgAction::SetTrue)]
        on_disk: bool,

        #[clap(flatten)]
        common: CommonArgs,
    },

    /// Estimate the similarity between two record files (plain or .gz)
    Sketch {
        /// Path to the reference records
        reference: PathBuf,

        /// Path to the other records
        other: PathBuf,

        #[clap(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// HyperLogLog precision
    #[clap(short, long, value_parser, default_value_t=DEFAULT_PRECISION)]
    precision: u8,

    /// Number of records read per batch
    #[clap(short, long, value_parser, default_value_t=DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Share of repeated records in generated datasets
    #[clap(short, long, value_parser, default_value_t=DEFAULT_DUPLICATES)]
    duplicates: f32,

    /// Seed for the choice of repeated records
    #[clap(long, value_parser)]
    seed: Option<u64>,

    /// Directory for generated files
    #[clap(short, long, value_parser)]
    workdir: Option<PathBuf>,

    /// Control the amount of output
    #[clap(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

impl From<&CommonArgs> for Settings {
    fn from(args: &CommonArgs) -> Self {
        Settings {
            precision: args.precision,
            batch_size: args.batch_size,
            duplicates: args.duplicates,
            seed: args.seed,
            workdir: args.workdir.clone().unwrap_or_else(env::temp_dir),
            verbose: args.verbose,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Cardinality { size, runs, common } => {
            run_cardinality(*size, *runs, &common.into())
        }
        Command::Similarity {
            similarity,
            origin_rows,
            dest_rows,
            on_disk,
            common,
        } => run_similarity(
            *similarity,
            *origin_rows,
            *dest_rows,
            *on_disk,
            &common.into(),
        ),
        Command::Sketch {
            reference,
            other,
            common,
        } => run_sketch(reference, other, &common.into()),
    }
}
