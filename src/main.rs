// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! fitvault command-line tool.
//!
//! Downloads Garmin Connect data into a local staging area and imports it
//! into the document store.

use chrono::{Days, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitvault::{
    config::{Config, StoreBackend},
    db::{DocumentStore, FirestoreStore, MemoryStore},
    error::{AppError, Result},
    models::RecordKind,
    services::{stats, DownloadMode, Downloader, GarminClient, ImportEngine, ImportRequest},
    staging::StagingStore,
};

#[derive(Parser)]
#[command(name = "fitvault")]
#[command(about = "Archive Garmin Connect fitness data in a document store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download raw data into the staging area
    Download {
        /// Only the most recent FITVAULT_LATEST_DAYS days
        #[arg(long)]
        latest: bool,
    },
    /// Import staged data into the document store
    Import {
        /// Kinds to import (comma separated); default: enabled kinds
        #[arg(long = "kind", value_delimiter = ',')]
        kinds: Vec<RecordKind>,
        /// Skip records dated before this day (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Skip records dated after this day (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Download the latest days and import them
    Update,
    /// Show document counts and date ranges per kind
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fitvault failed");
            ExitCode::from(e.exit_code())
        }
    }
}

/// Commands that need a document store.
enum StoreTask {
    Import(ImportRequest),
    Update,
    Stats,
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let task = match cli.command {
        Command::Download { latest } => {
            let mode = if latest {
                DownloadMode::Latest
            } else {
                DownloadMode::Full
            };
            return download(&config, mode, &cancel).await;
        }
        Command::Import { kinds, start, end } => {
            if let (Some(start), Some(end)) = (start, end) {
                if start > end {
                    return Err(AppError::BadRequest(format!(
                        "start {start} is after end {end}"
                    )));
                }
            }
            let kinds = if kinds.is_empty() {
                config.enabled_kinds.clone()
            } else {
                kinds
            };
            StoreTask::Import(ImportRequest::kinds(kinds).between(start, end))
        }
        Command::Update => StoreTask::Update,
        Command::Stats => StoreTask::Stats,
    };

    match config.store_backend {
        StoreBackend::Firestore => {
            let store = FirestoreStore::new(&config.gcp_project_id, config.store_timeout).await?;
            run_with_store(task, store, &config, &cancel).await
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; nothing is persisted");
            run_with_store(task, MemoryStore::new(), &config, &cancel).await
        }
    }
}

async fn run_with_store<S: DocumentStore>(
    task: StoreTask,
    store: S,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<()> {
    match task {
        StoreTask::Import(request) => import(store, config, &request, cancel).await,
        StoreTask::Update => {
            download(config, DownloadMode::Latest, cancel).await?;
            let today = Utc::now().date_naive();
            let since = today
                .checked_sub_days(Days::new(u64::from(config.latest_days.saturating_sub(1))))
                .unwrap_or(today);
            let request =
                ImportRequest::kinds(config.enabled_kinds.clone()).between(Some(since), None);
            import(store, config, &request, cancel).await
        }
        StoreTask::Stats => {
            let stats = stats::collect(&store, &RecordKind::ALL).await?;
            print_json(&stats)
        }
    }
}

async fn download(config: &Config, mode: DownloadMode, cancel: &CancellationToken) -> Result<()> {
    let client = GarminClient::from_config(config)?;
    let downloader = Downloader::new(client, StagingStore::new(config.data_dir.clone()), config);

    let report = downloader
        .run(mode, Utc::now().date_naive(), cancel)
        .await?;
    tracing::info!(
        written = report.total_written(),
        failed_kinds = report.failed_kinds.len(),
        failed_days = report.failed_days.len(),
        "Download finished"
    );
    Ok(())
}

async fn import<S: DocumentStore>(
    store: S,
    config: &Config,
    request: &ImportRequest,
    cancel: &CancellationToken,
) -> Result<()> {
    let engine = ImportEngine::from_config(store, config);
    match engine.run(request, cancel).await {
        Ok(report) => {
            tracing::info!(summary = %report, "Import complete");
            print_json(&report)
        }
        Err(aborted) => {
            print_json(&aborted.report)?;
            Err(aborted.into())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?;
    println!("{text}");
    Ok(())
}

/// First Ctrl-C cancels the run; in-flight writes still finish.
fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after current record");
            cancel.cancel();
        }
    });
}

/// Initialize structured JSON logging on stderr; stdout carries reports.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fitvault=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
