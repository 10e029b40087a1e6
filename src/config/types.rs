use serde::Deserialize;
use url::Url;

use crate::ConfigError;

/// Main configuration structure for Vitrina
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Storefront location and content shape
    pub source: SourceConfig,

    /// HTTP fetch and retry behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Worker pool behavior
    #[serde(default)]
    pub pool: PoolConfig,

    /// Snapshot output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Content shape a storefront serves its catalog in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFlavor {
    /// Server-rendered listing pages that link to per-product detail pages
    #[default]
    Markup,

    /// A JSON endpoint whose listing pages already carry complete records
    Records,
}

impl std::fmt::Display for SourceFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SourceFlavor::Markup => "markup",
            SourceFlavor::Records => "records",
        };
        write!(f, "{}", label)
    }
}

/// Storefront location and request identity
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Root URL of the storefront, scheme included
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Content shape served by the storefront
    #[serde(default)]
    pub flavor: SourceFlavor,

    /// Path of the category index page (markup flavor)
    #[serde(rename = "category-index-path", default = "default_category_index_path")]
    pub category_index_path: String,

    /// Path of the category records endpoint (records flavor)
    #[serde(rename = "categories-path", default = "default_categories_path")]
    pub categories_path: String,

    /// Path of the product records endpoint (records flavor)
    #[serde(rename = "products-path", default = "default_products_path")]
    pub products_path: String,

    /// Records requested per page from the products endpoint (records flavor)
    #[serde(rename = "per-page", default = "default_per_page")]
    pub per_page: u32,

    /// Category slugs discovery skips entirely
    #[serde(rename = "ignore-slugs", default = "default_ignore_slugs")]
    pub ignore_slugs: Vec<String>,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header sent with every request
    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,
}

/// HTTP fetch and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Attempts per fetch before the task is given up on
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Worker pool behavior
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Number of concurrent workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Pause each worker takes after finishing a task, in milliseconds
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Upper bound on listing pages walked per category
    #[serde(rename = "max-pages-per-category", default = "default_max_pages_per_category")]
    pub max_pages_per_category: u32,
}

/// Snapshot output settings
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path the JSON snapshot is written to
    #[serde(rename = "snapshot-path", default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// New products accumulated between incremental snapshot writes
    #[serde(rename = "flush-every", default = "default_flush_every")]
    pub flush_every: usize,

    /// Optional path for a markdown run summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl SourceConfig {
    /// Parses `base-url` into a [`Url`]
    ///
    /// Validation guarantees this succeeds for a loaded [`Config`], but the
    /// parse is still surfaced as a `ConfigError` for callers that build a
    /// `SourceConfig` by hand.
    pub fn base(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", self.base_url, e))
        })
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            workers: default_workers(),
            delay_ms: default_delay_ms(),
            max_pages_per_category: default_max_pages_per_category(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            snapshot_path: default_snapshot_path(),
            flush_every: default_flush_every(),
            summary_path: None,
        }
    }
}

fn default_category_index_path() -> String {
    "/shop".to_string()
}

fn default_categories_path() -> String {
    "/wp-json/wc/store/v1/products/categories".to_string()
}

fn default_products_path() -> String {
    "/wp-json/wc/store/v1/products".to_string()
}

fn default_per_page() -> u32 {
    20
}

fn default_ignore_slugs() -> Vec<String> {
    vec!["uncategorized".to_string()]
}

fn default_user_agent() -> String {
    format!("vitrina/{}", env!("CARGO_PKG_VERSION"))
}

fn default_accept_language() -> String {
    "es-MX,es;q=0.9".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_workers() -> usize {
    3
}

fn default_delay_ms() -> u64 {
    500
}

fn default_max_pages_per_category() -> u32 {
    200
}

fn default_snapshot_path() -> String {
    "snapshot.json".to_string()
}

fn default_flush_every() -> usize {
    20
}
