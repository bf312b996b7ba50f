//! `window-finder` CLI: search calendar snapshots for shared free time.
//!
//! ## Usage
//!
//! ```sh
//! # One request (stdin → stdout)
//! echo '{"type":"common_window","start_date":"2025-06-09","end_date":"2025-06-13","participants":["A","B"]}' \
//!   | window-finder search --calendars calendars.json
//!
//! # Request from a file, human-readable output
//! window-finder search --calendars calendars.json --request request.json --summary
//!
//! # Several requests, one report each
//! window-finder batch --calendars calendars.json --requests requests.json
//!
//! # Skip Russian federal holidays
//! window-finder --holidays ru search --calendars calendars.json --request request.json
//! ```
//!
//! Diagnostics go to stderr and are filtered by `RUST_LOG` (default `warn`).

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use window_engine::{
    CalendarRules, CalendarSnapshot, InMemorySource, ScheduleAnalyzer, SearchOutcome,
    SearchRequest,
};

#[derive(Parser)]
#[command(
    name = "window-finder",
    version,
    about = "Find shared free-time windows across calendars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Holiday calendar to skip when searching (no holidays if omitted)
    #[arg(long, global = true, value_enum)]
    holidays: Option<Holidays>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Holidays {
    /// Russian federal non-working days
    Ru,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search request
    Search {
        /// Calendar snapshot JSON file
        #[arg(short, long)]
        calendars: String,
        /// Request JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        request: Option<String>,
        /// Print a human-readable summary instead of JSON
        #[arg(long)]
        summary: bool,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Run a JSON array of requests and report each one
    Batch {
        /// Calendar snapshot JSON file
        #[arg(short, long)]
        calendars: String,
        /// JSON file holding an array of requests (reads from stdin if omitted)
        #[arg(short, long)]
        requests: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Search {
            calendars,
            request,
            summary,
            output,
        } => {
            let snapshot = load_snapshot(&calendars)?;
            let raw = read_input(request.as_deref())?;
            let request: SearchRequest =
                serde_json::from_str(&raw).context("Failed to parse search request")?;

            let mut analyzer = analyzer(snapshot, cli.holidays, std::slice::from_ref(&request));
            let outcome = analyzer
                .search(&request)
                .context("Search request rejected")?;

            let rendered = if summary {
                render_summary(&outcome)
            } else {
                serde_json::to_string_pretty(&outcome)?
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Batch {
            calendars,
            requests,
            output,
        } => {
            let snapshot = load_snapshot(&calendars)?;
            let raw = read_input(requests.as_deref())?;
            let requests: Vec<SearchRequest> =
                serde_json::from_str(&raw).context("Failed to parse request array")?;

            let mut analyzer = analyzer(snapshot, cli.holidays, &requests);
            let reports = analyzer.analyze(&requests);
            write_output(output.as_deref(), &serde_json::to_string_pretty(&reports)?)?;
        }
    }

    Ok(())
}

fn load_snapshot(path: &str) -> Result<CalendarSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path))?;
    let snapshot = CalendarSnapshot::from_json(&raw)
        .with_context(|| format!("Failed to parse calendar snapshot: {}", path))?;
    debug!(path, calendars = snapshot.calendars.len(), "calendar snapshot loaded");
    Ok(snapshot)
}

/// Build an analyzer whose holiday calendar covers every year the requests touch.
fn analyzer(
    snapshot: CalendarSnapshot,
    holidays: Option<Holidays>,
    requests: &[SearchRequest],
) -> ScheduleAnalyzer {
    let analyzer = ScheduleAnalyzer::new(InMemorySource::new(snapshot));
    let years = requests.iter().fold(None, |acc: Option<(i32, i32)>, r| {
        let (first, last) = (r.config.start_date.year(), r.config.end_date.year());
        Some(match acc {
            Some((lo, hi)) => (lo.min(first), hi.max(last)),
            None => (first, last),
        })
    });

    match (holidays, years) {
        (Some(Holidays::Ru), Some((first, last))) => {
            analyzer.with_rules(CalendarRules::russian_federal(first, last))
        }
        _ => analyzer,
    }
}

fn render_summary(outcome: &SearchOutcome) -> String {
    let body = match &outcome.window {
        Some(window) => format!("{}\n{}", window.title(), window.summary()),
        None => "No window found".to_string(),
    };
    format!("{}\n\n{}\n", body, outcome.stats)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
