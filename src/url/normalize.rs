use crate::UrlError;
use url::Url;

/// Canonicalizes a pagination link so equivalent pages compare equal as strings
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Lowercase the host
/// 3. Remove the fragment
/// 4. Remove the page-number parameter
/// 5. Sort the remaining query parameters by key (stable for repeated keys)
/// 6. Re-append the page-number parameter last
/// 7. Remove an empty query string
///
/// Running the function on its own output returns the same string.
///
/// # Arguments
///
/// * `link` - Absolute URL of a pagination link
/// * `page_param` - Name of the page-number query parameter
///
/// # Examples
///
/// ```
/// use shelf_harvest::url::canonicalize_page_url;
///
/// let a = canonicalize_page_url("https://shop.example.com/s?page=2&q=nike", "page").unwrap();
/// let b = canonicalize_page_url("https://shop.example.com/s?q=nike&page=2", "page").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "https://shop.example.com/s?q=nike&page=2");
/// ```
pub fn canonicalize_page_url(link: &str, page_param: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(link).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    url.set_fragment(None);

    let mut page_values = Vec::new();
    let mut params: Vec<(String, String)> = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == page_param {
            page_values.push(value.into_owned());
        } else {
            params.push((key.into_owned(), value.into_owned()));
        }
    }

    // Stable sort keeps repeated keys in their original relative order
    params.sort_by(|a, b| a.0.cmp(&b.0));

    // A link carrying the page parameter more than once is reduced to the last value
    if let Some(page) = page_values.pop() {
        params.push((page_param.to_string(), page));
    }

    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(params.iter());
    }

    Ok(url)
}

/// Builds the first listing URL for a search
///
/// The search term and page number are bound to the configured parameter names;
/// any query already present on the listing URL is preserved ahead of them.
pub fn build_listing_url(
    listing_url: &str,
    search_param: &str,
    search: &str,
    page_param: &str,
    page: u32,
) -> Result<Url, UrlError> {
    let mut url = Url::parse(listing_url).map_err(|e| UrlError::Parse(e.to_string()))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != search_param && k != page_param)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept.iter())
        .append_pair(search_param, search)
        .append_pair(page_param, &page.to_string());

    canonicalize_page_url(url.as_str(), page_param)
}
