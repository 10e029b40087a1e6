use crate::catalog::{CatalogCategory, ListingEntry};

/// Unit of work consumed by the scheduler's worker pool
///
/// Tasks are immutable once created. A retry of a failed request is handled
/// inside the fetcher with its own attempt counter; it never produces a new
/// task.
#[derive(Debug, Clone)]
pub enum ScrapeTask {
    /// Fetch one listing page of a category. Completing a page may enqueue
    /// the next page of the same category as a fresh task.
    Page { category: CatalogCategory, page: u32 },

    /// Fetch and normalize one product detail page.
    Detail { entry: ListingEntry },
}

impl ScrapeTask {
    /// The first listing page of a category; used to seed the queue
    pub fn first_page(category: CatalogCategory) -> Self {
        ScrapeTask::Page { category, page: 1 }
    }

    /// Category label the task contributes to, for logs and skip accounting
    pub fn category(&self) -> &str {
        match self {
            ScrapeTask::Page { category, .. } => &category.name,
            ScrapeTask::Detail { entry } => &entry.category,
        }
    }

    /// Short human description for worker logs
    pub fn describe(&self) -> String {
        match self {
            ScrapeTask::Page { category, page } => format!("{} page {}", category.name, page),
            ScrapeTask::Detail { entry } => entry.url.clone(),
        }
    }
}

/// Terminal resolution of a task
///
/// The earlier lifecycle states are positional (queued tasks live in the
/// intake channel, in-flight tasks on a worker), so only the terminal
/// states are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task ran to completion (an empty listing page counts: it is the
    /// category's normal pagination terminator)
    Completed,

    /// The fetch retry budget was exhausted; terminal but never fatal
    Skipped,
}

impl TaskOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, TaskOutcome::Skipped)
    }
}
