//! HTTP-backed render surface
//!
//! This surface renders pages without a browser:
//! - Navigation is a GET request that follows redirects
//! - The settled URL is the final URL after redirects
//! - Selector queries run over the fetched HTML with `scraper`
//!
//! Pages that need script execution to produce their markup are out of reach.

use crate::config::CrawlerConfig;
use crate::render::{select_nodes, RenderSurface, RenderedNode};
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// The page most recently loaded by a navigation
#[derive(Debug, Clone)]
struct LoadedPage {
    url: String,
    body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_millis(config.navigation_timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A render surface that fetches pages over plain HTTP
pub struct HttpRenderSurface {
    client: Client,
    current: Option<LoadedPage>,
}

impl HttpRenderSurface {
    /// Creates a surface from crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, HarvestError> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates a surface around an existing client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            current: None,
        }
    }
}

#[async_trait]
impl RenderSurface for HttpRenderSurface {
    /// Fetches a page, classifying failures into navigation errors
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with HTML body | Page loaded |
    /// | Non-2xx status | `Navigation` ("HTTP <code>") |
    /// | Non-HTML Content-Type | `Navigation` ("Expected HTML") |
    /// | Client timeout | `Timeout` |
    /// | Connection failure | `Navigation` ("Connection refused") |
    ///
    /// A failed navigation leaves no page loaded.
    async fn navigate(&mut self, url: &str) -> Result<(), HarvestError> {
        self.current = None;

        let response = self.client.get(url).send().await.map_err(|e| classify(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            let message = match status {
                StatusCode::NOT_FOUND => "HTTP 404 (dead link)".to_string(),
                StatusCode::TOO_MANY_REQUESTS => "HTTP 429 (rate limited)".to_string(),
                other => format!("HTTP {}", other.as_u16()),
            };
            return Err(HarvestError::Navigation {
                url: url.to_string(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(HarvestError::Navigation {
                url: url.to_string(),
                message: format!("Expected HTML, got {}", content_type),
            });
        }

        let body = response.text().await.map_err(|e| classify(url, e))?;

        tracing::trace!(url = %final_url, bytes = body.len(), "Page loaded");
        self.current = Some(LoadedPage {
            url: final_url,
            body,
        });

        Ok(())
    }

    async fn wait_for_settled_url(&mut self, pattern: &str) -> Result<(), HarvestError> {
        match &self.current {
            Some(page) if page.url.contains(pattern) => Ok(()),
            Some(page) => Err(HarvestError::Unsettled {
                url: page.url.clone(),
                pattern: pattern.to_string(),
            }),
            None => Err(HarvestError::Navigation {
                url: String::new(),
                message: "no page loaded".to_string(),
            }),
        }
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|page| page.url.as_str())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<RenderedNode>, HarvestError> {
        match &self.current {
            Some(page) => select_nodes(&page.body, selector),
            None => Ok(Vec::new()),
        }
    }
}

/// Maps a transport error onto the crate's navigation taxonomy
fn classify(url: &str, error: reqwest::Error) -> HarvestError {
    if error.is_timeout() {
        HarvestError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        HarvestError::Navigation {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        HarvestError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
