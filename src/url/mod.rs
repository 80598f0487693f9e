//! URL handling module for Shelf-Harvest
//!
//! This module provides pagination-link canonicalization, same-host checks,
//! and item identifier derivation from detail links.

mod domain;
mod normalize;

pub use domain::{extract_host, same_host};
pub use normalize::{build_listing_url, canonicalize_page_url};

use url::Url;

/// Derives an item identifier from its detail link
///
/// The identifier is the path segment following `prefix` (for example
/// `/product/abc-123/` with prefix `/product/` yields `abc-123`). When the
/// prefix is absent, the last non-empty path segment is used instead.
///
/// # Returns
///
/// * `Some(String)` - The derived identifier
/// * `None` - The link has no usable path segment
///
/// # Examples
///
/// ```
/// use shelf_harvest::url::item_id_from_link;
/// use url::Url;
///
/// let link = Url::parse("https://shop.example.com/product/air-max-90?ref=list").unwrap();
/// assert_eq!(item_id_from_link(&link, "/product/"), Some("air-max-90".to_string()));
/// ```
pub fn item_id_from_link(link: &Url, prefix: &str) -> Option<String> {
    let path = link.path();

    let tail = match path.find(prefix) {
        Some(idx) if !prefix.is_empty() => &path[idx + prefix.len()..],
        _ => path,
    };

    let candidate = if tail.len() < path.len() {
        tail.split('/').find(|s| !s.is_empty())
    } else {
        tail.rsplit('/').find(|s| !s.is_empty())
    };

    candidate.map(str::to_string)
}
