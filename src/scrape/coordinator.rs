//! Run orchestration
//!
//! This module wires one snapshot run together:
//! - Building the shared HTTP client
//! - Category discovery
//! - Resetting the snapshot and spawning the sink task
//! - Seeding and running the worker pool
//! - Assembling and reporting the run summary

use chrono::Utc;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::output::{run_sink, RunSummary, SnapshotWriter};
use crate::scrape::discovery::discover_categories;
use crate::scrape::fetcher::build_http_client;
use crate::scrape::scheduler::Scheduler;
use crate::{Result, VitrinaError};

/// Runs one complete catalog snapshot
///
/// This function orchestrates the entire run:
///
/// 1. Build the shared HTTP client
/// 2. Discover the storefront's categories (fatal when none are found)
/// 3. Reset the snapshot file and spawn the sink task
/// 4. Seed the worker pool with one first-page task per category
/// 5. Run the pool until the pending-work counter settles at zero
/// 6. Join the sink, assemble the summary, write the optional report
///
/// # Arguments
///
/// * `config` - The validated run configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Totals of the finished run
/// * `Err(VitrinaError)` - Discovery failed, the snapshot stopped being
///   writable, or a worker panicked
///
/// # Example
///
/// ```no_run
/// use vitrina::config::load_config;
/// use vitrina::scrape::run_snapshot;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("vitrina.toml"))?;
/// let summary = run_snapshot(config).await?;
/// println!("{} products collected", summary.products);
/// # Ok(())
/// # }
/// ```
pub async fn run_snapshot(config: Config) -> Result<RunSummary> {
    let started_at = Utc::now();
    let start = std::time::Instant::now();

    let client = build_http_client(&config.source, &config.fetch)?;
    let base = config.source.base()?;

    tracing::info!("Starting snapshot of {}", config.source.base_url);

    let categories = discover_categories(&client, &config.source, &config.fetch, &base).await?;
    for category in &categories {
        tracing::info!("  {} -> {}", category.name, category.endpoint);
    }

    tracing::info!(
        "Writing {} with {} workers, {} ms delay",
        config.output.snapshot_path,
        config.pool.workers,
        config.pool.delay_ms
    );

    let writer = SnapshotWriter::new(&config.output.snapshot_path, config.output.flush_every);
    writer.reset()?;

    let abort = Arc::new(AtomicBool::new(false));
    let (sink_tx, sink_rx) = mpsc::unbounded_channel();
    let sink = tokio::spawn(run_sink(sink_rx, writer, Arc::clone(&abort)));

    let scheduler = Scheduler::new(client, &config, base, sink_tx, abort)?;
    scheduler.seed(&categories);
    scheduler.run().await?;

    // The scheduler dropped the last sink sender, so the sink drains what
    // is left, writes the final snapshot, and returns its totals
    let totals = sink
        .await
        .map_err(|e| VitrinaError::Pool(format!("sink task panicked: {}", e)))??;

    let finished_at = Utc::now();
    let summary = RunSummary::from_totals(
        totals,
        categories.len(),
        started_at,
        finished_at,
        &config.output.snapshot_path,
    );
    summary.log();
    tracing::debug!("Run took {:?}", start.elapsed());

    if let Some(path) = &config.output.summary_path {
        summary.write_markdown(Path::new(path))?;
        tracing::info!("Summary report written to {}", path);
    }

    Ok(summary)
}
