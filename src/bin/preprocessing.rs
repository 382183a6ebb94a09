use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use polars::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rollcall_graph::Region;

/// Adds the macro-region of each deputy's state to the deputies table.
#[derive(Parser)]
#[command(name = "preprocessing", version)]
struct Args {
    /// Deputies table with a `siglaUf` column
    #[arg(long, default_value = "data/tables/deputies.csv")]
    input: PathBuf,
    /// Where to write the table; defaults to overwriting the input
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let df = CsvReader::from_path(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?
        .has_header(true)
        .infer_schema(None)
        .finish()?;

    // Map "siglaUf" to its region, leaving unknown states empty
    let mut region_col = df
        .column("siglaUf")?
        .utf8()?
        .into_iter()
        .map(|opt_val| opt_val.and_then(Region::for_uf).map(|region| region.as_str()))
        .collect::<Utf8Chunked>()
        .into_series();
    region_col.rename("region");

    let unknown = region_col.null_count() - df.column("siglaUf")?.null_count();
    if unknown > 0 {
        warn!(unknown, "deputies with an unrecognized state");
    }

    let mut new_df = df;
    new_df.with_column(region_col)?;

    println!("{:?}", new_df.head(Some(5)));

    let output = args.output.unwrap_or(args.input);
    let mut file = File::create(&output)?;
    CsvWriter::new(&mut file).finish(&mut new_df)?;
    info!(path = %output.display(), rows = new_df.height(), "wrote deputies table");

    Ok(())
}
