use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use colmeans::data::{filter, loader};
use colmeans::{aggregate, AggregateOptions, AggregateResult, NegativePolicy, Statistic};

/// Compute per-column means of a CSV, JSON or Parquet table
#[derive(Parser, Debug)]
#[command(name = "colmeans", version)]
#[command(about = "Compute per-column means of a CSV, JSON or Parquet table", long_about = None)]
struct Cli {
    /// Input table (.csv, .json, .parquet)
    file: PathBuf,

    /// Columns to aggregate, comma separated (case-sensitive)
    #[arg(short, long, value_delimiter = ',', required_unless_present = "list")]
    columns: Vec<String>,

    /// List the columns of the table and exit
    #[arg(short, long, conflicts_with = "columns")]
    list: bool,

    /// Compute the geometric mean instead of the arithmetic mean
    #[arg(short, long)]
    geometric: bool,

    /// Use the absolute value of negative inputs to the geometric mean
    #[arg(long, requires = "geometric")]
    abs_negatives: bool,

    /// Ignore missing cells instead of producing NaN
    #[arg(long)]
    skip_missing: bool,

    /// Keep only rows where COL equals VALUE (repeatable)
    #[arg(short = 'w', long = "where", value_name = "COL=VALUE")]
    filters: Vec<String>,

    /// Print the result as a JSON object
    #[arg(long)]
    json: bool,

    /// Decimal places in text output
    #[arg(short, long, default_value = "4")]
    precision: usize,

    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("{err:?}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut dataset = loader::load_file(&cli.file)?;

    if cli.list {
        for col in dataset.columns() {
            println!("{}\t{}", col.name, col.data.kind());
        }
        return Ok(());
    }

    if !cli.filters.is_empty() {
        let row_filter = filter::parse_clauses(&cli.filters).map_err(anyhow::Error::msg)?;
        let rows = filter::filtered_indices(&dataset, &row_filter)?;
        log::info!("{} of {} rows pass the filter", rows.len(), dataset.len());
        dataset = dataset
            .take(&rows)
            .context("filtered row index out of range")?;
    }

    let statistic = if cli.geometric {
        Statistic::GeometricMean
    } else {
        Statistic::Mean
    };
    let options = AggregateOptions {
        skip_missing: cli.skip_missing,
        negatives: if cli.abs_negatives {
            NegativePolicy::Absolute
        } else {
            NegativePolicy::Reject
        },
    };

    let result = aggregate(&dataset, &cli.columns, statistic, options)
        .with_context(|| format!("computing {statistic} of {}", cli.file.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_table(&result, cli.precision);
    }
    Ok(())
}

fn print_table(result: &AggregateResult, precision: usize) {
    let width = result.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in result.iter() {
        println!("{name:<width$}  {value:.precision$}");
    }
}
