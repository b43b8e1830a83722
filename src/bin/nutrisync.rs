//! nutrisync CLI - aggregate diet-tracker CSV exports from the command line
//!
//! Reads one or more export files (or stdin), runs the ingestion pipeline,
//! and writes the merged result as JSON. The network and database
//! collaborators of a full sync setup stay out of scope; this binary is the
//! local, file-in/JSON-out edge of the engine.

use clap::Parser;
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use nutrisync::{ExportProcessor, IngestConfig, MergedExport, NUTRISYNC_VERSION};

/// Aggregate diet-tracker CSV exports into daily nutrition series
#[derive(Parser)]
#[command(name = "nutrisync")]
#[command(version = NUTRISYNC_VERSION)]
#[command(about = "Aggregate diet-tracker CSV exports", long_about = None)]
struct Cli {
    /// Export files to ingest, merged in argument order (use - for stdin)
    #[arg(required = false)]
    files: Vec<PathBuf>,

    /// Output file path (use - for stdout)
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// Also emit one food entry per logged line item
    #[arg(long)]
    foods: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Skip files that fail to decode instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Print only the summary, not the full series
    #[arg(long)]
    summary: bool,
}

#[derive(Serialize)]
struct Report {
    summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<Vec<nutrisync::DailyNutrition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    food_entries: Option<Vec<nutrisync::FoodEntry>>,
}

#[derive(Serialize)]
struct Summary {
    files_ingested: usize,
    files_skipped: usize,
    unique_days: usize,
    food_entries: usize,
    rows_read: usize,
    rows_skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_date: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("nutrisync: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = IngestConfig {
        extract_food_entries: cli.foods,
    };
    let mut processor = ExportProcessor::new(config);
    let mut files_ingested = 0;
    let mut files_skipped = 0;

    let inputs = if cli.files.is_empty() {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("nutrisync: reading CSV from stdin (pass files or pipe input)");
        }
        vec![PathBuf::from("-")]
    } else {
        cli.files
    };

    for path in &inputs {
        let bytes = read_input(path)?;
        match processor.process(&bytes) {
            Ok(()) => files_ingested += 1,
            Err(e) if cli.skip_invalid => {
                eprintln!("nutrisync: skipping {}: {e}", path.display());
                files_skipped += 1;
            }
            Err(e) => return Err(format!("{}: {e}", path.display()).into()),
        }
    }

    let merged = processor.finish();
    let report = build_report(merged, files_ingested, files_skipped, cli.summary, cli.foods);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    write_output(&cli.output, &json)?;

    Ok(())
}

fn build_report(
    merged: MergedExport,
    files_ingested: usize,
    files_skipped: usize,
    summary_only: bool,
    foods: bool,
) -> Report {
    let (first_date, last_date) = match merged.date_range() {
        Some((first, last)) => (Some(first.to_string()), Some(last.to_string())),
        None => (None, None),
    };

    Report {
        summary: Summary {
            files_ingested,
            files_skipped,
            unique_days: merged.unique_days(),
            food_entries: merged.food_entry_count(),
            rows_read: merged.rows_read,
            rows_skipped: merged.rows_skipped,
            first_date,
            last_date,
        },
        days: (!summary_only).then_some(merged.days),
        food_entries: (!summary_only && foods).then_some(merged.food_entries),
    }
}

fn read_input(path: &PathBuf) -> io::Result<Vec<u8>> {
    if path.to_string_lossy() == "-" {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read(path)
    }
}

fn write_output(path: &PathBuf, json: &str) -> io::Result<()> {
    if path.to_string_lossy() == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    } else {
        fs::write(path, format!("{json}\n"))
    }
}
