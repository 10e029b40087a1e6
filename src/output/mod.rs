//! Snapshot persistence and run reporting
//!
//! This module handles:
//! - The sink task that drains normalized products out of the engine
//! - Deterministic, fully sorted JSON snapshot writes
//! - End-of-run summary logging and the optional markdown report

mod snapshot;
mod summary;

pub use snapshot::{run_sink, sort_products, SinkMessage, SinkTotals, SnapshotWriter};
pub use summary::RunSummary;
