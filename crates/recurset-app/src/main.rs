//! `recurset` CLI: normalize iCalendar events into storage records.
//!
//! ## Usage
//!
//! ```sh
//! # Whole calendar file, one record per VEVENT
//! recurset calendar.ics
//!
//! # Bare property block on stdin, compact output
//! printf 'DTSTART;VALUE=DATE:20090821\nDTEND;VALUE=DATE:20090822\nRRULE:FREQ=YEARLY\n' \
//!     | recurset --compact
//! ```

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use recurset_core::config::load_config;
use recurset_core::error::CoreError;
use recurset_rfc::rfc::ical::{ChronoTzResolver, normalize_all};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

mod report;

/// Normalize the recurrence metadata of iCalendar events into storage records.
#[derive(Debug, Parser)]
#[command(name = "recurset", version)]
struct Cli {
    /// File holding a VCALENDAR, VEVENT blocks or a bare event property
    /// block. Reads stdin when omitted.
    file: Option<PathBuf>,

    /// Print compact JSON regardless of `output.pretty`.
    #[arg(long)]
    compact: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config()?;

    tracing::debug!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let input = read_input(cli.file.as_ref())?;
    if input.trim().is_empty() {
        return Err(CoreError::InvalidInput("no event data to normalize".to_string()).into());
    }

    let resolver = ChronoTzResolver::with_aliases(config.timezone.aliases.clone());
    let results = match normalize_all(&input, &resolver) {
        Ok(results) => results,
        Err(e) => {
            tracing::error!(error = %e, "Input could not be parsed");
            vec![Err(e)]
        }
    };

    let pretty = config.output.pretty && !cli.compact;
    println!("{}", report::render(&results, pretty)?);

    let failed = report::failure_count(&results);
    if failed > 0 {
        tracing::warn!(failed, total = results.len(), "Some events failed to normalize");
        return Ok(ExitCode::FAILURE);
    }

    tracing::info!(total = results.len(), "All events normalized");
    Ok(ExitCode::SUCCESS)
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}
