// SPDX-License-Identifier: MIT

//! Command-line driver: builds a square matrix, reduces it with the chosen
//! variant and prints the total, the extrema and the elapsed time.

use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::error;
use tracing_subscriber::EnvFilter;

use matrixsum::config::{DEFAULT_MAX_SIZE, DEFAULT_MAX_WORKERS};
use matrixsum::{Field, Limits, RunConfig, Variant, WorkerPool};

/// Exclusive upper bound of the random cell values.
const RANDOM_CEILING: i32 = 99;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    /// Static strips, barrier, leader reduces.
    A,
    /// Static strips, locked accumulate.
    B,
    /// Dynamic rows, locked accumulate.
    C,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::A => Variant::A,
            VariantArg::B => Variant::B,
            VariantArg::C => Variant::C,
        }
    }
}

/// Sum a matrix and find its extrema with a pool of worker threads.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Side length of the square matrix, clamped to [1, max size].
    size: Option<usize>,
    /// Number of worker threads, clamped to [1, max workers].
    workers: Option<usize>,
    /// Coordination discipline.
    #[arg(long, value_enum, default_value = "a")]
    variant: VariantArg,
    /// Seed for the random fill.
    #[arg(long)]
    seed: Option<u64>,
    /// Fill every cell with this value instead of random numbers.
    #[arg(long)]
    constant: Option<i32>,
    /// Print the matrix before reducing it.
    #[arg(long)]
    print_matrix: bool,
    /// Largest accepted matrix size.
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
    max_size: usize,
    /// Largest accepted worker count.
    #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
    max_workers: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> matrixsum::Result<()> {
    let limits = Limits::new(args.max_size, args.max_workers)?;
    let config = RunConfig::clamped(
        args.size.unwrap_or(limits.max_size),
        args.workers.unwrap_or(limits.max_workers),
        args.variant.into(),
        limits,
    );

    let field = match args.constant {
        Some(value) => Field::square(config.size, &limits, |_, _| value)?,
        None => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            Field::square(config.size, &limits, |_, _| rng.gen_range(0..RANDOM_CEILING))?
        }
    };
    if args.print_matrix {
        print!("{field}");
    }

    let pool = WorkerPool::new(config.workers, &limits)?;
    let start_time = Instant::now();
    let result = pool.run_variant(&field, config.variant)?;
    let elapsed = start_time.elapsed();

    println!("{result}");
    if config.variant == Variant::C {
        println!("The cells processed is {}", result.cells_processed);
    }
    println!("The execution time is {} sec", elapsed.as_secs_f64());
    Ok(())
}
