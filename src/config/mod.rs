//! Configuration for Vitrina
//!
//! One required TOML file describes the storefront, the fetch policy,
//! the worker pool, and the output artifacts. Loading always validates.
//!
//! # Example
//!
//! ```no_run
//! use vitrina::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("vitrina.toml")).unwrap();
//! println!("Scraping {} with {} workers", config.source.base_url, config.pool.workers);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, FetchConfig, OutputConfig, PoolConfig, SourceConfig, SourceFlavor};

// Exposed so the CLI can re-validate after applying overrides
pub use validation::validate;
