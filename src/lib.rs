//! Shelf-Harvest: a listing crawler with structured extraction
//!
//! This crate walks a paginated listing site, follows each item's detail link,
//! and turns the harvested HTML into typed records through an external
//! structured-extraction service.

pub mod config;
pub mod crawler;
pub mod extraction;
pub mod render;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Shelf-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation timeout for {url}")]
    Timeout { url: String },

    #[error("Page settled on {url}, expected a URL containing '{pattern}'")]
    Unsettled { url: String, pattern: String },

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Extraction service error: {0}")]
    Service(String),

    #[error("Extraction service returned an unusable response: {0}")]
    MalformedResponse(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid environment override {name}: {message}")]
    Env { name: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Shelf-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{extract_items, run_crawl, Coordinator};
pub use state::{CrawlQuery, ExtractedRecord, ItemStub};
pub use url::{canonicalize_page_url, item_id_from_link, same_host};
