//! Listing harvester for extracting item stubs
//!
//! For each item container on a listing page this module extracts:
//! - The detail link (first anchor inside the container)
//! - An identifier derived from that link's path
//! - The container's raw HTML as the summary fragment

use crate::crawler::links::resolve_link;
use crate::render::RenderedNode;
use crate::state::ItemStub;
use crate::url::item_id_from_link;
use url::Url;

/// Extracts item stubs from matched item containers
///
/// Containers without a usable link or identifier are skipped. A page with
/// no containers yields an empty vector; that is not an error.
///
/// # Arguments
///
/// * `containers` - Item elements matched on the listing page
/// * `page_url` - URL the listing page was loaded from
/// * `detail_prefix` - Path prefix preceding the identifier in detail links
///
/// # Example
///
/// ```
/// use shelf_harvest::crawler::harvest_items;
/// use shelf_harvest::render::select_nodes;
/// use url::Url;
///
/// let html = r#"<div class="card"><a href="/product/sku-1">Shoe</a></div>"#;
/// let nodes = select_nodes(html, "div.card").unwrap();
/// let page = Url::parse("https://shop.example.com/search?q=shoe").unwrap();
/// let stubs = harvest_items(&nodes, &page, "/product/");
/// assert_eq!(stubs[0].id, "sku-1");
/// assert_eq!(stubs[0].detail_link, "https://shop.example.com/product/sku-1");
/// ```
pub fn harvest_items(
    containers: &[RenderedNode],
    page_url: &Url,
    detail_prefix: &str,
) -> Vec<ItemStub> {
    let mut stubs = Vec::with_capacity(containers.len());

    for container in containers {
        let Some(link) = container
            .first_link()
            .and_then(|href| resolve_link(href, page_url))
        else {
            tracing::debug!(page = %page_url, "Item container has no usable link");
            continue;
        };

        let Some(id) = item_id_from_link(&link, detail_prefix) else {
            tracing::debug!(link = %link, "Could not derive item id");
            continue;
        };

        stubs.push(ItemStub::new(id, container.html.clone(), link.to_string()));
    }

    stubs
}
