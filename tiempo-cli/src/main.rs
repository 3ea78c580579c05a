use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tiempo_engine::{EventCallback, FetchEvent, FetcherConfig, TimelapseEngine, last_cycle_utc};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod error;

use cli::CliArgs;
use error::AppError;

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        // Log the full error for debugging
        error!(error = ?e, "Application failed");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn bootstrap() -> Result<(), AppError> {
    // Parse command-line arguments
    let args = CliArgs::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Initialization(e.to_string()))?;

    if args.concurrency == 0 {
        return Err(AppError::InvalidInput(
            "concurrency must be at least 1".to_string(),
        ));
    }

    let cache_dir = args.cache_dir.clone().unwrap_or_else(|| PathBuf::from("cache"));

    let mut builder = FetcherConfig::builder()
        .with_cache_dir(cache_dir.clone())
        .with_max_concurrent(args.concurrency)
        .with_neighbor_radius(args.radius)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_connect_timeout(Duration::from_secs(args.connect_timeout));
    if let Some(template) = &args.url_template {
        builder = builder.with_url_template(template);
    }
    let config = builder.build();

    info!(cache_dir = %cache_dir.display(), concurrency = args.concurrency, "Starting tiempo");
    info!(
        "Assuming model cycle {}",
        last_cycle_utc(Utc::now()).format("%Y-%m-%d %H:%MZ")
    );

    let engine = TimelapseEngine::new(config).await?;
    if let Some(index) = engine.domain().index_of(args.current) {
        engine.set_current_index(index);
    } else {
        warn!(
            offset = args.current,
            "Requested offset is not in the forecast domain, starting from the first frame"
        );
    }
    info!(
        cached = engine.frames().loaded_count(),
        total = engine.domain().len(),
        "Frames available from previous runs"
    );

    match args.interval {
        None => {
            refresh_once(&engine, args.force).await?;
        }
        Some(minutes) => {
            let period = Duration::from_secs(minutes.max(1) * 60);
            loop {
                refresh_once(&engine, args.force).await?;
                info!(minutes = minutes.max(1), "Sleeping until next refresh");
                tokio::time::sleep(period).await;
            }
        }
    }

    Ok(())
}

async fn refresh_once(engine: &TimelapseEngine, force: bool) -> Result<(), AppError> {
    let total = engine.domain().len() as u64;
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .map_err(|e| AppError::Initialization(e.to_string()))?,
    );

    let bar = progress.clone();
    let callback: EventCallback = Arc::new(move |event| match event {
        FetchEvent::Loaded { offset, .. } => {
            bar.set_message(format!("T+{offset:03}h updated"));
        }
        FetchEvent::NotModified { offset } => {
            bar.set_message(format!("T+{offset:03}h unchanged"));
        }
        FetchEvent::Failed { offset, reason } => {
            bar.suspend(|| warn!(offset, reason = %reason, "Frame failed"));
        }
        FetchEvent::Progress { completed, .. } => {
            bar.set_position(completed as u64);
        }
        FetchEvent::BatchFinished => {}
    });

    let summary = engine.refresh(force, Some(callback)).await?;
    progress.finish_and_clear();

    info!(
        updated = summary.accepted,
        unchanged = summary.unchanged,
        failed = summary.failed,
        total = summary.total,
        "Refresh complete"
    );
    Ok(())
}
