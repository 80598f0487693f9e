use crate::config::types::{
    Config, CrawlerConfig, ExtractionConfig, RateLimitConfig, ServerConfig, SiteConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_extraction_config(&config.extraction)?;
    validate_rate_limit_config(&config.rate_limit)?;
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }
    Ok(())
}

/// Validates the listing site description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("listing_url", &config.listing_url)?;

    for (name, value) in [
        ("search_param", &config.search_param),
        ("page_param", &config.page_param),
        ("detail_link_prefix", &config.detail_link_prefix),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.search_param == config.page_param {
        return Err(ConfigError::Validation(format!(
            "search_param and page_param must differ, both are '{}'",
            config.page_param
        )));
    }

    for (name, value) in [
        ("pagination_selector", &config.pagination_selector),
        ("item_selector", &config.item_selector),
        ("detail_selector", &config.detail_selector),
    ] {
        validate_selector(name, value)?;
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "navigation_timeout_ms must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    validate_http_url("extraction base_url", &config.base_url)?;

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    if config.items_per_batch < 1 {
        return Err(ConfigError::Validation(format!(
            "items_per_batch must be >= 1, got {}",
            config.items_per_batch
        )));
    }

    if config.max_batch_tokens < 1 {
        return Err(ConfigError::Validation(
            "max_batch_tokens must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Longest accepted rate limit window (one day)
const MAX_WINDOW_MS: u64 = 86_400_000;

fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.max_requests < 1 {
        return Err(ConfigError::Validation(format!(
            "max_requests must be >= 1, got {}",
            config.max_requests
        )));
    }

    if config.window_ms < 1 {
        return Err(ConfigError::Validation(
            "window_ms must be >= 1".to_string(),
        ));
    }

    if config.window_ms > MAX_WINDOW_MS {
        return Err(ConfigError::Validation(format!(
            "window_ms must be <= {}, got {}",
            MAX_WINDOW_MS, config.window_ms
        )));
    }

    Ok(())
}

/// Validates that a value parses as an absolute HTTP(S) URL
fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", name, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name,
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates that a value is a non-empty, parseable CSS selector
fn validate_selector(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    Selector::parse(value).map_err(|e| {
        ConfigError::Validation(format!("{} '{}' is not a valid selector: {:?}", name, value, e))
    })?;

    Ok(())
}
