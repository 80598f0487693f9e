//! Crawler module for listing traversal and item enrichment
//!
//! This module contains the core crawling logic, including:
//! - The listing-page frontier and its page budget
//! - Pagination link resolution
//! - Item stub harvesting from listing pages
//! - Detail page enrichment
//! - Overall crawl coordination

mod coordinator;
mod detail;
mod frontier;
mod harvester;
mod links;
mod pagination;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{extract_items, run_crawl, Coordinator};
pub use detail::{enrich_details, DetailStats};
pub use frontier::Frontier;
pub use harvester::harvest_items;
pub use links::resolve_link;
pub use pagination::resolve_pagination;

use crate::render::RenderSurface;
use crate::HarvestError;
use std::time::Duration;

/// Navigates the surface, failing with a timeout error after `limit`
pub(crate) async fn navigate_within<R>(
    surface: &mut R,
    url: &str,
    limit: Duration,
) -> Result<(), HarvestError>
where
    R: RenderSurface + ?Sized,
{
    match tokio::time::timeout(limit, surface.navigate(url)).await {
        Ok(result) => result,
        Err(_) => Err(HarvestError::Timeout {
            url: url.to_string(),
        }),
    }
}
