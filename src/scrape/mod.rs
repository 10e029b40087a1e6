//! The scraping engine
//!
//! This module contains the run machinery, including:
//! - HTTP fetching with retry and backoff
//! - Category discovery for both source flavors
//! - The worker pool, its task queue, and completion accounting
//! - Overall run orchestration

mod coordinator;
mod discovery;
mod fetcher;
mod scheduler;

pub use coordinator::run_snapshot;
pub use discovery::discover_categories;
pub use fetcher::{build_http_client, fetch_once, fetch_with_retry, FetchedPage};
pub use scheduler::Scheduler;
