//! Shelf-Harvest main entry point
//!
//! This is the command-line interface for the Shelf-Harvest scrape server.

use anyhow::Context;
use clap::Parser;
use shelf_harvest::config::{load_config_with_hash, load_default_config, Config};
use shelf_harvest::server;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelf-Harvest: a listing crawler with structured extraction
///
/// Shelf-Harvest serves a scrape endpoint that walks a paginated listing,
/// follows each item's detail page, and returns typed records produced by a
/// structured-extraction service.
#[derive(Parser, Debug)]
#[command(name = "shelf-harvest")]
#[command(version)]
#[command(about = "A listing crawler with structured extraction", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and print the effective settings without serving
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            load_default_config().context("invalid default configuration")?
        }
    };

    if cli.check {
        print_settings(&config);
        return Ok(());
    }

    if config.extraction.api_key.is_empty() {
        tracing::warn!("No extraction API key configured; extraction calls will be rejected");
    }

    server::serve(config).await.context("server failed")?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_harvest=info,tower_http=info,warn"),
            1 => EnvFilter::new("shelf_harvest=debug,tower_http=debug,info"),
            2 => EnvFilter::new("shelf_harvest=trace,debug"),
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

/// Handles --check: prints the validated settings
fn print_settings(config: &Config) {
    println!("=== Shelf-Harvest Configuration ===\n");

    println!("Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);

    println!("\nSite:");
    println!("  Listing URL: {}", config.site.listing_url);
    println!(
        "  Query params: {}=<search>, {}=<page>",
        config.site.search_param, config.site.page_param
    );
    println!("  Item selector: {}", config.site.item_selector);
    println!("  Pagination selector: {}", config.site.pagination_selector);
    println!("  Detail link prefix: {}", config.site.detail_link_prefix);
    println!("  Detail selector: {}", config.site.detail_selector);

    println!("\nCrawler:");
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nExtraction:");
    println!("  Endpoint: {}", config.extraction.base_url);
    println!("  Model: {}", config.extraction.model);
    println!(
        "  API key: {}",
        if config.extraction.api_key.is_empty() {
            "not set"
        } else {
            "set"
        }
    );
    println!("  Items per batch: {}", config.extraction.items_per_batch);
    println!("  Max batch tokens: {}", config.extraction.max_batch_tokens);
    println!(
        "  Request timeout: {}ms",
        config.extraction.request_timeout_ms
    );

    println!("\nRate limit:");
    println!(
        "  {} requests per {}ms per client",
        config.rate_limit.max_requests, config.rate_limit.window_ms
    );
    println!(
        "  Client key: {}",
        if config.rate_limit.trust_forwarded_headers {
            "forwarded headers, then peer address"
        } else {
            "peer address"
        }
    );

    println!("\n✓ Configuration is valid");
}
