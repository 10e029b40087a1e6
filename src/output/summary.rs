//! End-of-run summary reporting
//!
//! Every run logs its totals; when a summary path is configured the same
//! totals are also rendered as a small markdown report.

use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::output::SinkTotals;
use crate::{Result, VitrinaError};

/// Everything a finished run reports
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub finished_at: DateTime<Utc>,

    /// Categories the run walked
    pub categories: usize,

    /// Final deduplicated product count
    pub products: usize,

    /// Product counts per category, sorted by label
    pub per_category: Vec<(String, usize)>,

    /// Tasks that exhausted their retry budget
    pub skipped: usize,

    /// Snapshot writes over the run, the final write included
    pub snapshot_writes: usize,

    /// Where the snapshot landed
    pub snapshot_path: String,
}

impl RunSummary {
    /// Assembles the summary from sink totals and run timing
    ///
    /// # Arguments
    ///
    /// * `totals` - Counters the sink accumulated
    /// * `categories` - Number of discovered categories
    /// * `started_at` - When the run started
    /// * `finished_at` - When the run finished
    /// * `snapshot_path` - Where the snapshot was written
    pub fn from_totals(
        totals: SinkTotals,
        categories: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        snapshot_path: &str,
    ) -> Self {
        let mut per_category: Vec<(String, usize)> = totals.per_category.into_iter().collect();
        per_category.sort();

        Self {
            started_at,
            finished_at,
            categories,
            products: totals.products,
            per_category,
            skipped: totals.skipped,
            snapshot_writes: totals.writes,
            snapshot_path: snapshot_path.to_string(),
        }
    }

    /// Wall-clock duration of the run
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Logs the end-of-run report
    pub fn log(&self) {
        tracing::info!(
            "Run complete: {} products across {} categories in {}s",
            self.products,
            self.categories,
            self.duration().num_seconds()
        );
        for (category, count) in &self.per_category {
            tracing::info!("  {}: {} products", category, count);
        }
        if self.skipped > 0 {
            tracing::warn!(
                "{} tasks were skipped after exhausting their retries",
                self.skipped
            );
        }
        tracing::info!(
            "Snapshot at {} ({} writes)",
            self.snapshot_path,
            self.snapshot_writes
        );
    }

    /// Formats the summary as markdown
    pub fn render_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Vitrina Run Summary\n\n");

        md.push_str("## Run Information\n\n");
        md.push_str(&format!(
            "- **Started**: {}\n",
            self.started_at.to_rfc3339()
        ));
        md.push_str(&format!(
            "- **Finished**: {}\n",
            self.finished_at.to_rfc3339()
        ));
        md.push_str(&format!(
            "- **Duration**: {} seconds\n",
            self.duration().num_seconds()
        ));
        md.push_str(&format!("- **Snapshot**: {}\n", self.snapshot_path));
        md.push_str(&format!(
            "- **Snapshot Writes**: {}\n\n",
            self.snapshot_writes
        ));

        md.push_str("## Totals\n\n");
        md.push_str(&format!("- **Products**: {}\n", self.products));
        md.push_str(&format!("- **Categories**: {}\n", self.categories));
        md.push_str(&format!("- **Skipped Tasks**: {}\n\n", self.skipped));

        if !self.per_category.is_empty() {
            md.push_str("## Products per Category\n\n");
            md.push_str("| Category | Products |\n");
            md.push_str("|----------|----------|\n");
            for (category, count) in &self.per_category {
                md.push_str(&format!("| {} | {} |\n", category, count));
            }
            md.push_str("\n");
        }

        md
    }

    /// Writes the markdown report
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file path
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Report written
    /// * `Err(VitrinaError::SummaryWrite)` - The file could not be written
    pub fn write_markdown(&self, path: &Path) -> Result<()> {
        let markdown = self.render_markdown();

        let mut file = File::create(path).map_err(|e| summary_error(path, e))?;
        file.write_all(markdown.as_bytes())
            .map_err(|e| summary_error(path, e))?;

        Ok(())
    }
}

fn summary_error(path: &Path, source: std::io::Error) -> VitrinaError {
    VitrinaError::SummaryWrite {
        path: path.display().to_string(),
        source,
    }
}
