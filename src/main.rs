//! # onthisday
//!
//! Downloads and prints major historic events for any calendar date.
//!
//! ## Usage
//!
//! ```sh
//! onthisday download            # populate the cache for all 366 dates
//! onthisday random              # one random event for today
//! onthisday events -d 07/04     # every event on July 4th
//! ```
//!
//! Logs go to stderr (`RUST_LOG` controls verbosity); results go to stdout.

use clap::Parser;
use onthisday::cli::{Cli, Command};
use onthisday::outputs::text;
use onthisday::utils::ensure_writable_dir;
use onthisday::{CacheStore, Downloader, OnThisDayError, QueryEngine, Source};
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(OnThisDayError::CacheMiss(_)) = e.downcast_ref::<OnThisDayError>() {
                eprintln!("Have you downloaded the events with 'onthisday download'?");
            }
            exit_code(e.as_ref())
        }
    }
}

async fn run(args: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    let config = args.resolve_config()?;
    info!(
        data_dir = %config.data_dir.display(),
        source = ?config.source,
        layout = ?config.layout,
        "Configuration resolved"
    );

    let source = Source::from_config(&config)?;
    let store = CacheStore::new(&config.data_dir, config.layout);

    match &args.command {
        Command::Random(query) => {
            let filter = query.filter()?;
            let date = query.date();
            let engine = QueryEngine::from_config(source, store, &config);
            let event = engine.get_random_event(date, &filter).await?;
            println!("{}", text::random_line(date, &event));
        }
        Command::Events { query, grouped } => {
            let filter = query.filter()?;
            let engine = QueryEngine::from_config(source, store, &config);
            let events = engine.get_events(query.date(), &filter).await?;
            print!("{}", text::event_list(&events, *grouped));
        }
        Command::Download { overwrite, .. } => {
            ensure_writable_dir(&config.data_dir).await?;
            store.remove_stale_temp_files().await?;
            let cached = store.count_days(&config.categories).await?;
            let downloader = Downloader::from_config(source, store, &config);
            eprintln!("Downloading historic events for every date ({cached}/366 already cached)...");

            let report = tokio::select! {
                report = downloader.download_all(*overwrite) => report?,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted; remaining dates abandoned");
                    return Ok(ExitCode::from(130));
                }
            };

            eprintln!(
                "Done: {} written, {} skipped, {} failed.",
                report.written,
                report.skipped,
                report.failed.len()
            );
            for (date, reason) in &report.failed {
                eprintln!("  {date}: {reason}");
            }
            if !report.is_complete() {
                return Ok(ExitCode::from(1));
            }
        }
    }

    debug!(elapsed_ms = start_time.elapsed().as_millis() as u64, "Execution complete");
    Ok(ExitCode::SUCCESS)
}

/// Map typed failures to process exit codes.
fn exit_code(err: &(dyn Error + 'static)) -> ExitCode {
    let code = match err.downcast_ref::<OnThisDayError>() {
        Some(OnThisDayError::InvalidCategory(_))
        | Some(OnThisDayError::InvalidDate(_))
        | Some(OnThisDayError::Config(_)) => 2,
        Some(OnThisDayError::CacheMiss(_))
        | Some(OnThisDayError::SourceUnavailable { .. })
        | Some(OnThisDayError::NoEventsFound(_)) => 3,
        Some(OnThisDayError::Parse(_)) => 4,
        _ => {
            error!(error = %err, "Unexpected failure");
            1
        }
    };
    ExitCode::from(code)
}
