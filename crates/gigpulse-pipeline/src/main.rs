//! `gigpulse` command line
//!
//! - `run [--dry-run]`: the full nightly pipeline
//! - `extract <platform>`: one extraction, stored as latest and archived
//! - `report [--date D]`: re-synthesize an archived day and print it
//! - `patch`: patch the tracking document from the latest snapshots
//! - `send <file>`: deliver a text file through the chat channel

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use gigpulse_pipeline::{Pipeline, PipelineConfig, RunOptions, Services};
use gigpulse_snapshot::Platform;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gigpulse", version, about = "Nightly Fiverr and Upwork brief")]
struct Cli {
    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every stage
    Run {
        /// Print the brief instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Extract one marketplace
    Extract {
        /// fiverr or upwork
        platform: Platform,
    },
    /// Print the brief for an archived day
    Report {
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Patch the tracking document from the latest snapshots
    Patch,
    /// Send a text file through the chat channel
    Send {
        file: PathBuf,
    },
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let config = PipelineConfig::from_env().context("invalid configuration")?;
    let services = Services::from_config(&config).context("failed to build network clients")?;
    let pipeline = Pipeline::new(config, services);
    let now = Utc::now();

    match cli.command {
        Command::Run { dry_run } => {
            let options = RunOptions::new().with_dry_run(dry_run);
            let span = tracing::info_span!("run", run_id = %options.run_id);
            let outcome = pipeline.run(now, options).instrument(span).await;

            for line in outcome.status.status_lines() {
                println!("{line}");
            }
            if dry_run {
                if let Some(text) = outcome.alert.as_deref() {
                    println!("\n{text}");
                } else if let Some(brief) = &outcome.brief {
                    println!("\n{}", brief.text);
                }
            }
            Ok(exit_code(outcome.status.succeeded()))
        }
        Command::Extract { platform } => match pipeline.extract(platform, now).await {
            Ok(snapshot) => {
                println!(
                    "[ok] {platform}: {} section failure(s)",
                    snapshot.section_failures.len()
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                println!("[failed] {err}");
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Report { date } => {
            let date = date.unwrap_or_else(|| now.date_naive());
            match pipeline.report_for(date).await {
                Ok(brief) => {
                    println!("{}", brief.text);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    println!("[failed] {err}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Patch => match pipeline.patch_latest(now.date_naive()).await {
            Ok(report) => {
                println!(
                    "[ok] {} row(s) updated, {} unmatched listing(s)",
                    report.rows_updated.len(),
                    report.unmatched_listings.len()
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                println!("[failed] {err}");
                Ok(ExitCode::FAILURE)
            }
        },
        Command::Send { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let ok = match pipeline.send(&text).await {
                Ok(report) => {
                    println!("[ok] {} chunk(s) sent", report.chunks_sent);
                    true
                }
                Err(err) => {
                    println!("[failed] {err}");
                    false
                }
            };
            Ok(exit_code(ok))
        }
    }
}
