//! Command-line entry point for the dataset generator.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pharma_dash_gen::{generate_rows, write_dataset, DEFAULT_OUTPUT};

#[derive(Debug, Parser)]
#[clap(about, version, author, name = "pharma-dash-gen")]
struct Cli {
    /// Number of rows to generate.
    #[clap(long, default_value_t = 200)]
    rows: usize,

    /// Output CSV path.
    #[clap(long, short, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Seed for reproducible output. Random when omitted.
    #[clap(long)]
    seed: Option<u64>,

    /// Reference date (YYYY-MM-DD) for expiry and manufacture dates.
    /// Defaults to the local date.
    #[clap(long)]
    today: Option<NaiveDate>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let rows = generate_rows(&mut rng, cli.rows, today);
    let file = File::create(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    write_dataset(&rows, BufWriter::new(file))
        .with_context(|| format!("writing {}", cli.output.display()))?;

    info!(rows = rows.len(), output = %cli.output.display(), seed = ?cli.seed, "generated dataset");
    Ok(())
}
