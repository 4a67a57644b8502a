use crate::config::AppConfig;
use crate::pipeline::schedule::{parse_cron, run_scheduled, DEFAULT_CRON};
use crate::pipeline::{run_cycle, IngestContext, Pipeline};
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod fetchers;
mod geos;
mod pipeline;

#[cfg(test)]
mod tests;

/// Poll job-listing and air-quality APIs and keep a local document store
/// up to date.
#[derive(Parser, Debug)]
#[command(name = "harvest", version, about)]
struct Cli {
    /// SQLite database file (overrides DATABASE_PATH).
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one ingestion cycle now.
    Run {
        #[arg(value_enum, default_value_t = Pipeline::All)]
        pipeline: Pipeline,
    },
    /// Run ingestion cycles on a cron schedule until interrupted.
    Schedule {
        #[arg(long, env = "HARVEST_CRON", default_value = DEFAULT_CRON)]
        cron: String,

        #[arg(long, value_enum, default_value_t = Pipeline::All)]
        pipeline: Pipeline,
    },
    /// Show the most recent ingestion runs.
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(path) = cli.database {
        config.database_path = path;
    }

    // Without the database no ingestion is possible; fail the process.
    let ctx = IngestContext::open(config).context("startup failed")?;

    match cli.command {
        Command::Run { pipeline } => {
            for (pipeline, report) in run_cycle(&ctx, pipeline, Utc::now()) {
                if report.succeeded() {
                    info!(%pipeline, %report, "cycle complete");
                } else {
                    warn!(%pipeline, %report, "cycle completed with problems");
                }
            }
        }
        Command::Schedule { cron, pipeline } => {
            let schedule = parse_cron(&cron)?;
            info!(cron = %cron, %pipeline, "scheduler started");
            run_scheduled(&schedule, |now| {
                for (pipeline, report) in run_cycle(&ctx, pipeline, now) {
                    info!(%pipeline, %report, "scheduled cycle complete");
                }
            });
        }
        Command::Runs { limit } => {
            let runs = ctx
                .db()
                .with_conn(|conn| db::runs::get_recent_runs(conn, limit))?;
            for run in runs {
                println!(
                    "#{:<5} {:<12} {}  {}  pages={} upserted={} failures={} swept={}{}",
                    run.id,
                    run.pipeline,
                    run.started_at.format("%Y-%m-%d %H:%M:%S"),
                    if run.success { "ok  " } else { "FAIL" },
                    run.pages_fetched.unwrap_or(0),
                    run.records_upserted.unwrap_or(0),
                    run.failures.unwrap_or(0),
                    run.records_swept.unwrap_or(0),
                    run.error_message
                        .as_deref()
                        .map(|m| format!("  ({m})"))
                        .unwrap_or_default(),
                );
            }
        }
    }

    ctx.shutdown()?;
    Ok(())
}
