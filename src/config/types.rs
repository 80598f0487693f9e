use serde::Deserialize;

/// Main configuration structure for Shelf-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub extraction: ExtractionConfig,
    #[serde(rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
}

/// HTTP ingress binding
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Where the listing lives and how its pages are laid out
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Base URL of the search listing (query parameters are appended)
    pub listing_url: String,

    /// Query parameter carrying the caller's search term
    pub search_param: String,

    /// Query parameter carrying the page number
    pub page_param: String,

    /// Selector for pagination anchors on a listing page
    pub pagination_selector: String,

    /// Selector for item containers on a listing page
    pub item_selector: String,

    /// Path prefix preceding the item identifier in detail links
    pub detail_link_prefix: String,

    /// Selector for the content region of a detail page
    pub detail_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://www.example-shop.com/search".to_string(),
            search_param: "q".to_string(),
            page_param: "page".to_string(),
            pagination_selector: "nav.pagination a[href]".to_string(),
            item_selector: "div.product-card".to_string(),
            detail_link_prefix: "/product/".to_string(),
            detail_selector: "div.product-details".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Upper bound for a single navigation (milliseconds)
    pub navigation_timeout_ms: u64,

    /// User agent sent with every navigation
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            user_agent: concat!("shelf-harvest/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Structured-extraction service wiring and batching bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,

    /// Maximum number of items packed into one extraction request
    pub items_per_batch: usize,

    /// Estimated token ceiling for one composite document
    pub max_batch_tokens: usize,

    /// Upper bound for a single extraction call (milliseconds)
    pub request_timeout_ms: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            items_per_batch: 5,
            max_batch_tokens: 100_000,
            request_timeout_ms: 120_000,
        }
    }
}

/// Ingress admission control
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_ms: u64,

    /// Key clients on `X-Forwarded-For` / `X-Real-IP` instead of the socket peer.
    /// Only safe behind a proxy that overwrites these headers.
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_ms: 60_000,
            trust_forwarded_headers: false,
        }
    }
}
