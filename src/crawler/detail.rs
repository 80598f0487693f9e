//! Detail fetcher for enriching item stubs
//!
//! Detail pages are visited one at a time on the shared render surface. A
//! failure on one item is logged and leaves that stub without detail HTML;
//! it never aborts the remaining items. Nothing is retried.

use crate::config::SiteConfig;
use crate::crawler::navigate_within;
use crate::render::RenderSurface;
use crate::state::ItemStub;
use crate::HarvestError;
use std::time::Duration;

/// Outcome counts for one enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailStats {
    /// Stubs that received detail HTML
    pub enriched: usize,

    /// Detail pages that loaded but had no detail region
    pub missing: usize,

    /// Detail pages that failed to load or query
    pub failed: usize,
}

/// Visits each stub's detail link and attaches the detail region's HTML
///
/// # Arguments
///
/// * `surface` - The render surface, held exclusively for the whole pass
/// * `stubs` - Stubs to enrich in place
/// * `site` - Detail selector and link prefix
/// * `timeout` - Upper bound for each navigation
pub async fn enrich_details<R>(
    surface: &mut R,
    stubs: &mut [ItemStub],
    site: &SiteConfig,
    timeout: Duration,
) -> DetailStats
where
    R: RenderSurface + ?Sized,
{
    let mut stats = DetailStats::default();

    for stub in stubs.iter_mut() {
        match fetch_detail(surface, &stub.detail_link, site, timeout).await {
            Ok(Some(html)) => {
                stub.detail_html = Some(html);
                stats.enriched += 1;
            }
            Ok(None) => {
                tracing::warn!(item = %stub.id, url = %stub.detail_link, "Detail region not found");
                stats.missing += 1;
            }
            Err(e) => {
                tracing::warn!(item = %stub.id, error = %e, "Detail fetch failed, continuing");
                stats.failed += 1;
            }
        }
    }

    tracing::debug!(
        enriched = stats.enriched,
        missing = stats.missing,
        failed = stats.failed,
        "Detail enrichment finished"
    );

    stats
}

async fn fetch_detail<R>(
    surface: &mut R,
    url: &str,
    site: &SiteConfig,
    timeout: Duration,
) -> Result<Option<String>, HarvestError>
where
    R: RenderSurface + ?Sized,
{
    navigate_within(surface, url, timeout).await?;

    // Links that fell back to a last-segment id carry no prefix to wait on
    if url.contains(&site.detail_link_prefix) {
        surface.wait_for_settled_url(&site.detail_link_prefix).await?;
    }

    let nodes = surface.query_all(&site.detail_selector).await?;
    Ok(nodes.into_iter().next().map(|node| node.html))
}
