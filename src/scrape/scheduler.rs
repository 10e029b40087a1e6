//! Worker pool driving the scrape to completion
//!
//! This module handles:
//! - The shared task queue workers pull from
//! - Pending-work accounting that decides when the run is over
//! - Run-wide product URL deduplication
//! - Per-flavor page processing (markup listings vs JSON records)
//! - Politeness delays between requests on the same worker
//!
//! Pagination is lazy: a listing page queues its own successor, so the
//! queue being empty never proves the run is done. The pending counter
//! is incremented at submit time and decremented when a task reaches a
//! terminal outcome, and follow-on tasks are registered before their
//! parent retires. The counter therefore reads zero exactly when nothing
//! is queued and nothing is in flight.

use reqwest::Client;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use url::Url;

use crate::catalog::{CatalogCategory, ListingEntry, ScrapeTask, TaskOutcome};
use crate::config::{Config, SourceFlavor};
use crate::extract::{parse_product_records, raw_from_record, DetailExtractor, ListingExtractor};
use crate::normalize::normalize;
use crate::output::SinkMessage;
use crate::scrape::fetcher::fetch_with_retry;
use crate::url::canonicalize;
use crate::{Result, VitrinaError};

/// How often the supervisor re-checks the pending-work counter
const SUPERVISOR_POLL: Duration = Duration::from_millis(200);

/// Signed count of tasks that are queued or held by a worker
#[derive(Debug, Clone, Default)]
struct PendingWork(Arc<AtomicI64>);

impl PendingWork {
    /// Accounts for a task before it enters the queue
    fn register(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    /// Accounts for a task reaching a terminal outcome
    fn retire(&self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }

    /// True when nothing is queued and nothing is in flight
    fn is_idle(&self) -> bool {
        self.0.load(Ordering::SeqCst) <= 0
    }

    fn count(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run-wide set of canonical product URLs already claimed by a task
#[derive(Debug, Clone, Default)]
struct SeenUrls(Arc<Mutex<HashSet<String>>>);

impl SeenUrls {
    /// Claims a URL; true exactly once per distinct URL per run
    async fn first_sighting(&self, url: &str) -> bool {
        self.0.lock().await.insert(url.to_string())
    }

    /// Distinct products claimed so far, for progress logs
    async fn len(&self) -> usize {
        self.0.lock().await.len()
    }
}

/// State shared by every worker in a run
struct Shared {
    client: Client,
    base: Url,
    flavor: SourceFlavor,
    max_attempts: u32,
    politeness: Duration,
    max_pages_per_category: u32,
    listing: ListingExtractor,
    detail: DetailExtractor,
    pending: PendingWork,
    seen: SeenUrls,
    tasks_tx: mpsc::UnboundedSender<ScrapeTask>,
    tasks_rx: Mutex<mpsc::UnboundedReceiver<ScrapeTask>>,
    sink_tx: mpsc::UnboundedSender<SinkMessage>,
    abort: Arc<AtomicBool>,
}

impl Shared {
    /// Queues a task, registering it with the pending counter first
    ///
    /// Once the run has aborted no new work is accepted; tasks already on
    /// a worker finish on their own.
    fn submit(&self, task: ScrapeTask) {
        if self.abort.load(Ordering::SeqCst) {
            tracing::debug!("Dropping task after abort: {}", task.describe());
            return;
        }
        self.pending.register();
        if self.tasks_tx.send(task).is_err() {
            // Intake closed under us; undo the registration so the
            // supervisor still reaches zero
            self.pending.retire();
        }
    }

    async fn process_task(&self, task: ScrapeTask) -> TaskOutcome {
        match task {
            ScrapeTask::Page { category, page } => self.process_page(category, page).await,
            ScrapeTask::Detail { entry } => self.process_detail(entry).await,
        }
    }

    /// Fetches one listing page and hands the body to the flavor pipeline
    ///
    /// An exhausted fetch skips the page, which also ends pagination for
    /// the category: no body means no successor task.
    async fn process_page(&self, category: CatalogCategory, page: u32) -> TaskOutcome {
        let url = category.page_url(page);
        let fetched = match fetch_with_retry(&self.client, &url, self.max_attempts).await {
            Ok(fetched) => fetched,
            Err(error) => {
                tracing::warn!("Skipping {} page {}: {}", category.name, page, error);
                return TaskOutcome::Skipped;
            }
        };

        match self.flavor {
            SourceFlavor::Markup => {
                self.process_markup_page(category, page, &fetched.body).await
            }
            SourceFlavor::Records => {
                self.process_records_page(category, page, &fetched.body).await
            }
        }
    }

    /// Queues a detail task per unseen product link, then the next page
    ///
    /// Pagination continues only while the page yielded at least one new
    /// product and linked to its successor. A page of nothing but already
    /// seen products means another category has walked this ground.
    async fn process_markup_page(
        &self,
        category: CatalogCategory,
        page: u32,
        body: &str,
    ) -> TaskOutcome {
        let listing = self
            .listing
            .extract(body, &self.base, &category.name, page + 1);

        let mut fresh = 0usize;
        for entry in listing.entries {
            if !self.seen.first_sighting(&entry.url).await {
                continue;
            }
            fresh += 1;
            self.submit(ScrapeTask::Detail { entry });
        }

        tracing::info!(
            "{} page {}: {} new products ({} total)",
            category.name,
            page,
            fresh,
            self.seen.len().await
        );

        if fresh > 0 && listing.has_next {
            if page < self.max_pages_per_category {
                self.submit(ScrapeTask::Page {
                    page: page + 1,
                    category,
                });
            } else {
                tracing::warn!(
                    "{} reached the {}-page cap, stopping pagination",
                    category.name,
                    self.max_pages_per_category
                );
            }
        }

        TaskOutcome::Completed
    }

    /// Normalizes a page of JSON records straight to the sink
    ///
    /// Records carry complete product data, so there are no detail tasks;
    /// an empty page is the category's normal pagination terminator.
    async fn process_records_page(
        &self,
        category: CatalogCategory,
        page: u32,
        body: &str,
    ) -> TaskOutcome {
        let records = match parse_product_records(body) {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!("Skipping {} page {}: {}", category.name, page, error);
                return TaskOutcome::Skipped;
            }
        };

        if records.is_empty() {
            tracing::info!("{} page {}: end of listings", category.name, page);
            return TaskOutcome::Completed;
        }

        if page < self.max_pages_per_category {
            self.submit(ScrapeTask::Page {
                category: category.clone(),
                page: page + 1,
            });
        } else {
            tracing::warn!(
                "{} reached the {}-page cap, stopping pagination",
                category.name,
                self.max_pages_per_category
            );
        }

        let mut batch = Vec::new();
        for record in records {
            let raw = raw_from_record(record);
            let link = raw
                .link
                .as_deref()
                .and_then(|permalink| canonicalize(&self.base, permalink));
            let Some(link) = link else {
                tracing::warn!("Record without a usable permalink in {}", category.name);
                continue;
            };
            if !self.seen.first_sighting(&link).await {
                continue;
            }

            let entry = ListingEntry {
                url: link,
                thumbnail: String::new(),
                category: category.name.clone(),
            };
            batch.push(normalize(raw, &entry));
        }

        tracing::info!(
            "{} page {}: {} new products ({} total)",
            category.name,
            page,
            batch.len(),
            self.seen.len().await
        );

        if !batch.is_empty() {
            let _ = self.sink_tx.send(SinkMessage::Products(batch));
        }

        TaskOutcome::Completed
    }

    /// Fetches one product detail page and normalizes it to the sink
    async fn process_detail(&self, entry: ListingEntry) -> TaskOutcome {
        let fetched = match fetch_with_retry(&self.client, &entry.url, self.max_attempts).await {
            Ok(fetched) => fetched,
            Err(error) => {
                tracing::warn!("Skipping product {}: {}", entry.url, error);
                return TaskOutcome::Skipped;
            }
        };

        let raw = self.detail.extract(&fetched.body, &self.base);
        let product = normalize(raw, &entry);
        tracing::debug!("Normalized {} ({})", product.name, product.link);

        let _ = self.sink_tx.send(SinkMessage::Products(vec![product]));
        TaskOutcome::Completed
    }
}

/// Fixed-size worker pool over one shared task queue
///
/// The scheduler owns run-wide accounting: a pending-work counter for
/// completion detection, a seen set for product deduplication, and the
/// abort flag the sink trips when the snapshot stops being writable.
pub struct Scheduler {
    shared: Arc<Shared>,
    workers: usize,
}

impl Scheduler {
    /// Creates a scheduler wired to the given sink
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client every worker shares
    /// * `config` - The run configuration
    /// * `base` - Parsed base URL of the storefront
    /// * `sink_tx` - Channel the sink task consumes
    /// * `abort` - Flag shared with the sink; once set, no new tasks are
    ///   accepted and the supervisor shuts the pool down
    ///
    /// # Returns
    ///
    /// * `Ok(Scheduler)` - Ready to seed and run
    /// * `Err(VitrinaError)` - A selector failed to compile
    pub fn new(
        client: Client,
        config: &Config,
        base: Url,
        sink_tx: mpsc::UnboundedSender<SinkMessage>,
        abort: Arc<AtomicBool>,
    ) -> Result<Self> {
        let (tasks_tx, tasks_rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            client,
            base,
            flavor: config.source.flavor,
            max_attempts: config.fetch.max_attempts,
            politeness: Duration::from_millis(config.pool.delay_ms),
            max_pages_per_category: config.pool.max_pages_per_category,
            listing: ListingExtractor::new()?,
            detail: DetailExtractor::new()?,
            pending: PendingWork::default(),
            seen: SeenUrls::default(),
            tasks_tx,
            tasks_rx: Mutex::new(tasks_rx),
            sink_tx,
            abort,
        });

        Ok(Self {
            shared,
            workers: config.pool.workers,
        })
    }

    /// Seeds the queue with the first page of every category
    ///
    /// Must be called before [`run`](Self::run) so the pending counter is
    /// already non-zero at the supervisor's first poll.
    pub fn seed(&self, categories: &[CatalogCategory]) {
        for category in categories {
            self.shared.submit(ScrapeTask::first_page(category.clone()));
        }
        tracing::debug!("Seeded {} category tasks", self.shared.pending.count());
    }

    /// Runs the pool until the catalog is exhausted
    ///
    /// Workers drain the shared queue while a supervisor polls the pending
    /// counter; once it reads zero (or the abort flag is set) the shutdown
    /// signal flips and every worker exits after its current task.
    pub async fn run(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut handles: Vec<JoinHandle<()>> = Vec::new();
        for worker_id in 0..self.workers {
            let shared = Arc::clone(&self.shared);
            let shutdown = shutdown_rx.clone();
            handles.push(tokio::spawn(worker_loop(worker_id, shared, shutdown)));
        }
        drop(shutdown_rx);

        loop {
            tokio::time::sleep(SUPERVISOR_POLL).await;
            if self.shared.pending.is_idle() {
                tracing::debug!("Pending work drained, closing intake");
                break;
            }
            if self.shared.abort.load(Ordering::SeqCst) {
                tracing::warn!(
                    "Aborting with {} tasks still pending",
                    self.shared.pending.count()
                );
                break;
            }
        }

        if shutdown_tx.send(true).is_err() {
            return Err(VitrinaError::Pool(
                "all workers exited before shutdown was signalled".to_string(),
            ));
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| VitrinaError::Pool(format!("worker panicked: {}", e)))?;
        }

        Ok(())
    }
}

/// One worker: pull a task, process it, retire it, pause
///
/// The politeness pause comes after the task has retired from the pending
/// counter, so completion detection never waits on a sleeping worker.
async fn worker_loop(worker_id: usize, shared: Arc<Shared>, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!("Worker {} started", worker_id);

    loop {
        let task = {
            let mut rx = shared.tasks_rx.lock().await;
            tokio::select! {
                biased;
                _ = shutdown.changed() => None,
                task = rx.recv() => task,
            }
        };

        let Some(task) = task else {
            break;
        };

        let label = task.category().to_string();
        tracing::debug!("Worker {} processing {}", worker_id, task.describe());

        let outcome = shared.process_task(task).await;
        if outcome.is_skipped() {
            let _ = shared.sink_tx.send(SinkMessage::Skipped { category: label });
        }
        shared.pending.retire();

        if !shared.politeness.is_zero() {
            tokio::time::sleep(shared.politeness).await;
        }
    }

    tracing::debug!("Worker {} stopped", worker_id);
}
