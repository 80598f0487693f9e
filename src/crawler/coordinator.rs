//! Crawler coordinator - main crawl orchestration logic
//!
//! This module runs one crawl end to end:
//! - Seeding the frontier with the search's first listing page
//! - Draining the frontier breadth-first within the page budget
//! - Harvesting item stubs and pagination links from each listing page
//! - Enriching stubs from their detail pages
//! - Batching stubs and fanning them out to the extraction service

use crate::config::Config;
use crate::crawler::detail::enrich_details;
use crate::crawler::frontier::Frontier;
use crate::crawler::harvester::harvest_items;
use crate::crawler::navigate_within;
use crate::crawler::pagination::resolve_pagination;
use crate::extraction::{build_batches, dispatch, ExtractionClient};
use crate::render::RenderSurface;
use crate::state::{CrawlQuery, ExtractedRecord, ItemStub};
use crate::url::build_listing_url;
use crate::HarvestError;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use url::Url;

/// What one listing page contributed
struct ListingPage {
    stubs: Vec<ItemStub>,
    pages: Vec<Url>,
}

/// Main crawler coordinator structure
///
/// Holds the render surface exclusively while it gathers items, so every
/// navigation (listing and detail) happens one at a time. Extraction needs no
/// surface and runs after the coordinator is done with it.
pub struct Coordinator<'a, R: ?Sized> {
    config: &'a Config,
    surface: &'a mut R,
}

impl<'a, R> Coordinator<'a, R>
where
    R: RenderSurface + ?Sized,
{
    /// Creates a coordinator over a borrowed surface
    pub fn new(config: &'a Config, surface: &'a mut R) -> Self {
        Self { config, surface }
    }

    /// Harvests the listing and enriches every stub from its detail page
    ///
    /// Collaborator failures are absorbed per page and per item and only
    /// reduce what is returned.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ItemStub>)` - Distinct stubs in discovery order
    /// * `Err(HarvestError)` - The crawl could not start (e.g. an unusable listing URL)
    pub async fn collect(&mut self, query: &CrawlQuery) -> Result<Vec<ItemStub>, HarvestError> {
        let config = self.config;

        tracing::info!(
            search = %query.search,
            from_page = query.from_page,
            to_page = query.to_page,
            "Starting crawl"
        );

        let mut stubs = self.harvest_listing(query).await?;

        let details = enrich_details(
            &mut *self.surface,
            &mut stubs,
            &config.site,
            Duration::from_millis(config.crawler.navigation_timeout_ms),
        )
        .await;

        tracing::info!(
            items = stubs.len(),
            details_enriched = details.enriched,
            details_failed = details.failed,
            "Item collection finished"
        );

        Ok(stubs)
    }

    /// Drains the frontier and returns every distinct stub found
    ///
    /// A listing page that fails to load abandons only that page's branch.
    pub async fn harvest_listing(&mut self, query: &CrawlQuery) -> Result<Vec<ItemStub>, HarvestError> {
        let site = &self.config.site;
        let origin = build_listing_url(
            &site.listing_url,
            &site.search_param,
            &query.search,
            &site.page_param,
            query.from_page,
        )?;

        let mut frontier = Frontier::new(query.page_budget());
        frontier.enqueue(origin.as_str());

        let mut stubs = Vec::new();
        let mut seen_ids = HashSet::new();

        while let Some(url) = frontier.next_url() {
            tracing::debug!(url = %url, "Processing listing page");

            let page = match self.process_listing_page(&url, &origin).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Listing page failed, skipping");
                    continue;
                }
            };

            let found = page.stubs.len();
            for stub in page.stubs {
                if seen_ids.insert(stub.id.clone()) {
                    stubs.push(stub);
                }
            }

            let queued = page
                .pages
                .iter()
                .filter(|link| frontier.enqueue(link.as_str()))
                .count();

            tracing::debug!(
                url = %url,
                items = found,
                new_pages = queued,
                visited = frontier.visited_count(),
                pending = frontier.pending_count(),
                "Listing page processed"
            );
        }

        tracing::info!(
            pages = frontier.visited_count(),
            items = stubs.len(),
            "Listing traversal finished"
        );

        Ok(stubs)
    }

    /// Loads one listing page and reads its items and pagination links
    async fn process_listing_page(
        &mut self,
        url: &str,
        origin: &Url,
    ) -> Result<ListingPage, HarvestError> {
        let site = &self.config.site;
        let timeout = Duration::from_millis(self.config.crawler.navigation_timeout_ms);

        navigate_within(&mut *self.surface, url, timeout).await?;

        let page_url = Url::parse(self.surface.current_url().unwrap_or(url))?;

        let containers = self.surface.query_all(&site.item_selector).await?;
        let stubs = harvest_items(&containers, &page_url, &site.detail_link_prefix);

        let anchors = self.surface.query_all(&site.pagination_selector).await?;
        let pages = resolve_pagination(&anchors, &page_url, origin, &site.page_param);

        Ok(ListingPage { stubs, pages })
    }
}

/// Batches collected stubs and extracts records from them
///
/// Failed or malformed batches contribute nothing; records keep discovery order.
pub async fn extract_items<E>(config: &Config, extractor: &E, stubs: Vec<ItemStub>) -> Vec<ExtractedRecord>
where
    E: ExtractionClient + ?Sized,
{
    let start_time = Instant::now();
    let item_count = stubs.len();

    let batches = build_batches(
        stubs,
        config.extraction.items_per_batch,
        config.extraction.max_batch_tokens,
    );

    let records = dispatch(
        extractor,
        &batches,
        Duration::from_millis(config.extraction.request_timeout_ms),
    )
    .await;

    tracing::info!(
        items = item_count,
        batches = batches.len(),
        records = records.len(),
        elapsed = ?start_time.elapsed(),
        "Extraction completed"
    );

    records
}

/// Runs a complete crawl for one query
///
/// # Arguments
///
/// * `config` - Site layout, timeouts, and batching bounds
/// * `surface` - The render surface, held while items are collected
/// * `extractor` - The structured-extraction service
/// * `query` - The validated crawl request
///
/// # Example
///
/// ```no_run
/// use shelf_harvest::config::Config;
/// use shelf_harvest::extraction::OpenAiExtractionClient;
/// use shelf_harvest::render::HttpRenderSurface;
/// use shelf_harvest::{run_crawl, CrawlQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let mut surface = HttpRenderSurface::new(&config.crawler)?;
/// let extractor = OpenAiExtractionClient::new(&config.extraction)?;
/// let records = run_crawl(&config, &mut surface, &extractor, &CrawlQuery::new("nike", 1, 2)).await?;
/// println!("{} records", records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<R, E>(
    config: &Config,
    surface: &mut R,
    extractor: &E,
    query: &CrawlQuery,
) -> Result<Vec<ExtractedRecord>, HarvestError>
where
    R: RenderSurface + ?Sized,
    E: ExtractionClient + ?Sized,
{
    let stubs = Coordinator::new(config, surface).collect(query).await?;
    Ok(extract_items(config, extractor, stubs).await)
}
