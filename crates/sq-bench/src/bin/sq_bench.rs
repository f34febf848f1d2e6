//! sq-bench: run the producer/consumer suite and write CSV or JSON.
//!
//! # Usage
//!
//! ```bash
//! sq-bench --producers 1,2,4 --consumers 1,2,4 --items 100000 --output results.csv
//! RUST_LOG=sq_bench=debug sq-bench --container two-stack-queue --format json
//! ```
//!
//! Progress goes to stderr; results go to `--output` or stdout.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sq_bench::{
    run_suite, write_results, ContainerKind, Format, Strategy, SuiteConfig, ITEMS_DEFAULT,
    ITEMS_MAX, THREADS_MAX,
};

/// Run the container benchmark suite.
#[derive(Parser, Debug)]
#[command(name = "sq-bench")]
#[command(about = "Producer/consumer throughput for synchronized stacks and queues")]
struct Cli {
    /// Producer thread counts to try.
    #[arg(long, value_delimiter = ',', default_values_t = [1, 2, 4])]
    producers: Vec<usize>,

    /// Consumer thread counts to try.
    #[arg(long, value_delimiter = ',', default_values_t = [1, 2, 4])]
    consumers: Vec<usize>,

    /// Items moved through the container per run.
    #[arg(long, default_value_t = ITEMS_DEFAULT)]
    items: u64,

    /// Consumer strategies (default: all).
    #[arg(long, value_enum, value_delimiter = ',')]
    strategy: Vec<Strategy>,

    /// Containers to benchmark (default: all).
    #[arg(long, value_enum, value_delimiter = ',')]
    container: Vec<ContainerKind>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Output file (stdout if not set).
    #[arg(long)]
    output: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.items > ITEMS_MAX {
        bail!("--items must be at most {}", ITEMS_MAX);
    }
    if let Some(&n) = cli
        .producers
        .iter()
        .chain(&cli.consumers)
        .find(|&&n| n == 0 || n > THREADS_MAX)
    {
        bail!("thread counts must be in 1..={}, got {}", THREADS_MAX, n);
    }

    let suite = SuiteConfig {
        producers: cli.producers,
        consumers: cli.consumers,
        items: cli.items,
        strategies: if cli.strategy.is_empty() {
            Strategy::ALL.to_vec()
        } else {
            cli.strategy
        },
        kinds: if cli.container.is_empty() {
            ContainerKind::ALL.to_vec()
        } else {
            cli.container
        },
    };

    let results = run_suite(&suite).context("benchmark run failed")?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_results(BufWriter::new(file), cli.format, &results)?;
            tracing::info!(path = %path.display(), runs = results.len(), "results written");
        }
        None => write_results(io::stdout().lock(), cli.format, &results)?,
    }

    Ok(())
}
