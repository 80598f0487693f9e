//! Rendering collaborator
//!
//! The crawl pipeline reads pages through a `RenderSurface`: something that
//! can be navigated to a URL and then queried with CSS selectors. One surface
//! is reused for a whole crawl, so only one navigation is ever in flight on it.

mod http;
mod node;

pub use http::{build_http_client, HttpRenderSurface};
pub use node::{parse_selector, select_nodes, RenderedNode};

use crate::HarvestError;
use async_trait::async_trait;

/// A navigable page that answers selector queries
#[async_trait]
pub trait RenderSurface: Send + Sync {
    /// Loads `url`, replacing whatever page was loaded before
    async fn navigate(&mut self, url: &str) -> Result<(), HarvestError>;

    /// Waits until the loaded page's URL contains `pattern`
    async fn wait_for_settled_url(&mut self, pattern: &str) -> Result<(), HarvestError>;

    /// URL of the loaded page after any redirects
    fn current_url(&self) -> Option<&str>;

    /// Serializes every element on the loaded page matching `selector`
    ///
    /// Zero matches (or no page loaded) yield an empty vector.
    async fn query_all(&self, selector: &str) -> Result<Vec<RenderedNode>, HarvestError>;
}
