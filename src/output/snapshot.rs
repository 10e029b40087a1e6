//! Snapshot sink: drains the product channel into the JSON file
//!
//! One sink task owns the snapshot file for the whole run. Products arrive
//! in completion order over a channel; the sink deduplicates them by
//! canonical link, keeps the set sorted by `(category, name)`, and
//! rewrites the file incrementally so an interrupted run still leaves a
//! valid, sorted snapshot behind.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::catalog::Product;
use crate::{Result, VitrinaError};

/// What workers send the sink
#[derive(Debug)]
pub enum SinkMessage {
    /// Normalized products ready for the snapshot
    Products(Vec<Product>),

    /// A task exhausted its retry budget; counted, never fatal
    Skipped { category: String },
}

/// Counters the sink accumulates over a run
#[derive(Debug, Clone, Default)]
pub struct SinkTotals {
    /// Final deduplicated product count
    pub products: usize,

    /// Product counts keyed by category label
    pub per_category: HashMap<String, usize>,

    /// Tasks that exhausted their retry budget
    pub skipped: usize,

    /// Snapshot writes over the run, the final write included
    pub writes: usize,
}

/// Writes the snapshot file as one pretty-printed JSON array
pub struct SnapshotWriter {
    path: PathBuf,
    flush_every: usize,
}

impl SnapshotWriter {
    /// Creates a writer for the given path and flush cadence
    pub fn new(path: impl AsRef<Path>, flush_every: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            flush_every: flush_every.max(1),
        }
    }

    /// New products to accumulate before the next incremental write
    pub fn flush_every(&self) -> usize {
        self.flush_every
    }

    /// Truncates the snapshot to an empty array
    ///
    /// A run starts from an empty snapshot; products from an earlier run
    /// never survive into the new file.
    pub fn reset(&self) -> Result<()> {
        self.write(&[])
    }

    /// Rewrites the snapshot with the given products, verbatim order
    ///
    /// Callers sort before writing; see [`sort_products`].
    pub fn write(&self, products: &[Product]) -> Result<()> {
        let json = serde_json::to_string_pretty(products)?;

        let mut file = File::create(&self.path).map_err(|e| self.write_error(e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| self.write_error(e))?;

        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> VitrinaError {
        VitrinaError::SnapshotWrite {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Stable sort by category then name; ties keep arrival order
pub fn sort_products(products: &mut [Product]) {
    products.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Drains the product channel into the snapshot file
///
/// Duplicate links are dropped, first success wins. The snapshot is
/// rewritten once `flush_every` new products have accumulated since the
/// last write, and always once more after the channel closes, so the
/// final file is complete and fully sorted even when the run collected
/// nothing.
///
/// A failed write sets the abort flag, which stops the scheduler from
/// accepting new work, and ends the sink with the error.
///
/// # Arguments
///
/// * `rx` - Channel the workers send [`SinkMessage`]s over
/// * `writer` - Destination snapshot file
/// * `abort` - Flag shared with the scheduler
///
/// # Returns
///
/// * `Ok(SinkTotals)` - Counters for the run summary
/// * `Err(VitrinaError)` - A snapshot write failed
pub async fn run_sink(
    mut rx: mpsc::UnboundedReceiver<SinkMessage>,
    writer: SnapshotWriter,
    abort: Arc<AtomicBool>,
) -> Result<SinkTotals> {
    let mut collected: Vec<Product> = Vec::new();
    let mut links: HashSet<String> = HashSet::new();
    let mut totals = SinkTotals::default();
    let mut unflushed = 0usize;

    while let Some(message) = rx.recv().await {
        match message {
            SinkMessage::Products(products) => {
                for product in products {
                    if !links.insert(product.link.clone()) {
                        tracing::debug!("Dropping duplicate product {}", product.link);
                        continue;
                    }
                    *totals
                        .per_category
                        .entry(product.category.clone())
                        .or_insert(0) += 1;
                    collected.push(product);
                    unflushed += 1;
                }

                if unflushed >= writer.flush_every() {
                    if let Err(error) = flush(&writer, &mut collected, &mut totals) {
                        abort.store(true, Ordering::SeqCst);
                        return Err(error);
                    }
                    unflushed = 0;
                }
            }

            SinkMessage::Skipped { category } => {
                totals.skipped += 1;
                tracing::debug!("Recorded a skipped task in {}", category);
            }
        }
    }

    // Channel closed: every producer is done
    if let Err(error) = flush(&writer, &mut collected, &mut totals) {
        abort.store(true, Ordering::SeqCst);
        return Err(error);
    }

    totals.products = collected.len();
    Ok(totals)
}

fn flush(
    writer: &SnapshotWriter,
    collected: &mut Vec<Product>,
    totals: &mut SinkTotals,
) -> Result<()> {
    sort_products(collected);
    writer.write(collected)?;
    totals.writes += 1;
    tracing::debug!("Snapshot written with {} products", collected.len());
    Ok(())
}
