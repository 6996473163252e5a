//! # Sales Report
//!
//! Prints a `SalesReport` as JSON.
//!
//! ## Usage
//! ```bash
//! # Today (local calendar day)
//! cargo run -p kasir-db --bin report
//!
//! # 1 to 7 February inclusive
//! cargo run -p kasir-db --bin report -- --start 2026-02-01 --end 2026-02-07
//! ```
//!
//! Exit status is 2 for caller errors (bad date, inverted range) and 1 for
//! storage failures.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use kasir_core::report::parse_calendar_date;
use kasir_db::{init_tracing, Database, KasirConfig, KasirError, KasirResult};

#[derive(Debug, Parser)]
#[command(name = "report")]
#[command(about = "Print a Kasir sales report as JSON")]
struct Args {
    /// Database file (overrides kasir.toml and KASIR_DB_PATH)
    #[arg(short, long)]
    db: Option<PathBuf>,

    /// Config file (default: platform config dir / kasir.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// First day, YYYY-MM-DD (requires --end)
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Last day, inclusive, YYYY-MM-DD (requires --start)
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match KasirConfig::load(args.config.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(db) = &args.db {
        config.database.path = db.clone();
    }
    init_tracing(&config.logging);

    let db = match Database::new(config.to_db_config()).await {
        Ok(db) => db,
        Err(err) => {
            error!(error = %err, "Failed to open database");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&db, &args).await;
    db.close().await;

    match result {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(kind = err.kind().code(), error = %err, "Report failed");
            if err.is_caller_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(db: &Database, args: &Args) -> KasirResult<String> {
    let report = match (&args.start, &args.end) {
        (Some(start), Some(end)) => {
            let start = parse_calendar_date("start", start)?;
            let end = parse_calendar_date("end", end)?;
            db.reports().report_for_dates(start, end).await?
        }
        _ => db.reports().daily_report().await?,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };

    // SalesReport holds only integers, strings and timestamps
    json.map_err(|e| KasirError::Storage(kasir_db::DbError::Internal(e.to_string())))
}
