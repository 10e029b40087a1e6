//! Core data model for the catalog snapshot
//!
//! This module contains the entities that flow through the engine:
//! - categories and listing entries produced by discovery and collection
//! - scrape tasks consumed by the worker pool
//! - raw extracted fields and the canonical Product output record

mod listing;
mod product;
mod raw;
mod task;

pub use listing::{CatalogCategory, ListingEntry};
pub use product::{Product, StockState};
pub use raw::{RawPrice, RawProduct, StockSignal};
pub use task::{ScrapeTask, TaskOutcome};
