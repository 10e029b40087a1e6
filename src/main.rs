//! Vitrina main entry point
//!
//! This is the command-line interface for the vitrina catalog snapshot tool.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vitrina::config::{load_config, validate, Config, SourceFlavor};
use vitrina::scrape::run_snapshot;

/// Vitrina: a storefront catalog snapshot tool
///
/// Vitrina walks an e-commerce storefront (categories, listing pages,
/// product details), normalizes every product it finds, and writes a
/// deterministic JSON snapshot of the whole catalog.
#[derive(Parser, Debug)]
#[command(name = "vitrina")]
#[command(version = "1.0.0")]
#[command(about = "A storefront catalog snapshot tool", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Snapshot path, overriding the configured one
    #[arg(long, value_name = "PATH")]
    output: Option<String>,

    /// Worker count, overriding the configured one
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Delay between requests on one worker, overriding the configured one
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Validate config and show the effective settings without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config(&cli.config) {
        Ok(cfg) => {
            tracing::info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Command-line overrides are validated like the file they amend
    apply_overrides(&mut config, &cli);
    validate(&config)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match run_snapshot(config).await {
        Ok(summary) => {
            tracing::info!("Snapshot completed successfully");
            if summary.products == 0 {
                tracing::warn!("The snapshot is empty; check the configured source");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Snapshot failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vitrina=info,warn"),
            1 => EnvFilter::new("vitrina=debug,info"),
            2 => EnvFilter::new("vitrina=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides onto the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(output) = &cli.output {
        config.output.snapshot_path = output.clone();
    }
    if let Some(workers) = cli.workers {
        config.pool.workers = workers;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.pool.delay_ms = delay_ms;
    }
}

/// Handles the --dry-run mode: shows the effective settings and exits
fn handle_dry_run(config: &Config) {
    println!("=== Vitrina Dry Run ===\n");

    println!("Source:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Flavor: {}", config.source.flavor);
    match config.source.flavor {
        SourceFlavor::Markup => {
            println!("  Category index: {}", config.source.category_index_path);
        }
        SourceFlavor::Records => {
            println!("  Categories path: {}", config.source.categories_path);
            println!("  Products path: {}", config.source.products_path);
            println!("  Per page: {}", config.source.per_page);
            println!("  Ignored slugs: {}", config.source.ignore_slugs.join(", "));
        }
    }
    println!("  User agent: {}", config.source.user_agent);
    println!("  Accept-Language: {}", config.source.accept_language);

    println!("\nFetch:");
    println!(
        "  Timeout: {}s (connect {}s)",
        config.fetch.timeout_secs, config.fetch.connect_timeout_secs
    );
    println!("  Max attempts: {}", config.fetch.max_attempts);

    println!("\nPool:");
    println!("  Workers: {}", config.pool.workers);
    println!("  Delay: {}ms", config.pool.delay_ms);
    println!(
        "  Max pages per category: {}",
        config.pool.max_pages_per_category
    );

    println!("\nOutput:");
    println!("  Snapshot: {}", config.output.snapshot_path);
    println!("  Flush every: {} products", config.output.flush_every);
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: (not written)"),
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would scrape {} as a {} source", config.source.base_url, config.source.flavor);
}
