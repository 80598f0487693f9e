//! Pagination discovery on listing pages

use crate::crawler::links::resolve_link;
use crate::render::RenderedNode;
use crate::url::{canonicalize_page_url, same_host};
use url::Url;

/// Turns pagination anchors into canonical, same-host listing URLs
///
/// Each anchor's href is resolved against `page_url`; links whose host differs
/// from `origin` are dropped so the crawl never leaves the listing site. The
/// output keeps discovery order and holds each canonical URL once.
///
/// # Arguments
///
/// * `anchors` - Pagination elements matched on the listing page
/// * `page_url` - URL the listing page was loaded from
/// * `origin` - The crawl's start URL
/// * `page_param` - Name of the page-number query parameter
pub fn resolve_pagination(
    anchors: &[RenderedNode],
    page_url: &Url,
    origin: &Url,
    page_param: &str,
) -> Vec<Url> {
    let mut pages: Vec<Url> = Vec::new();

    for href in anchors.iter().filter_map(RenderedNode::first_link) {
        let Some(absolute) = resolve_link(href, page_url) else {
            tracing::debug!(href, "Skipping unusable pagination link");
            continue;
        };

        if !same_host(&absolute, origin) {
            tracing::debug!(link = %absolute, "Discarding off-site pagination link");
            continue;
        }

        match canonicalize_page_url(absolute.as_str(), page_param) {
            Ok(canonical) if !pages.contains(&canonical) => pages.push(canonical),
            Ok(_) => {}
            Err(e) => tracing::debug!(link = %absolute, error = %e, "Failed to canonicalize"),
        }
    }

    pages
}
