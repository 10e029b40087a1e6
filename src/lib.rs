//! Vitrina: a storefront catalog snapshot tool
//!
//! This crate crawls an e-commerce storefront (category discovery, paginated
//! listings, product detail pages) and writes a normalized, deterministically
//! ordered JSON snapshot of every product it can reach.

pub mod catalog;
pub mod config;
pub mod extract;
pub mod normalize;
pub mod output;
pub mod scrape;
pub mod url;

use thiserror::Error;

/// Main error type for vitrina operations
#[derive(Debug, Error)]
pub enum VitrinaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Category discovery failed: {0}")]
    Discovery(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extractor error: {0}")]
    Extract(#[from] ExtractError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Snapshot write error for {path}: {source}")]
    SnapshotWrite {
        path: String,
        source: std::io::Error,
    },

    #[error("Summary write error for {path}: {source}")]
    SummaryWrite {
        path: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker pool error: {0}")]
    Pool(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Fetch-specific errors, classified so the retry loop can pick a backoff
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Rate limited (HTTP 429) at {url}")]
    RateLimited { url: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("{url} failed after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: String,
    },
}

impl FetchError {
    /// Returns true if the server signalled throttling (HTTP 429), which
    /// drives the steeper backoff curve.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }

    /// Returns true once the retry budget has been spent.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, FetchError::Exhausted { .. })
    }
}

/// Extractor-specific errors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    #[error("Malformed records payload: {0}")]
    Records(#[from] serde_json::Error),
}

/// Result type alias for vitrina operations
pub type Result<T> = std::result::Result<T, VitrinaError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use catalog::{CatalogCategory, ListingEntry, Product, ScrapeTask, StockState};
pub use config::Config;
pub use output::RunSummary;
pub use scrape::run_snapshot;
pub use url::canonicalize;
