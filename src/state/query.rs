/// Caller-supplied crawl parameters
use serde::Deserialize;

/// Raw `/scrape` query string values, before defaulting
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeParams {
    pub search: Option<String>,
    pub from_page: Option<String>,
    pub to_page: Option<String>,
}

/// A validated crawl request
///
/// `to_page` is a budget on the number of distinct listing pages visited,
/// not an absolute page number. It is never below `from_page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlQuery {
    pub search: String,
    pub from_page: u32,
    pub to_page: u32,
}

impl CrawlQuery {
    /// Creates a query, clamping the page bounds into range
    pub fn new(search: impl Into<String>, from_page: u32, to_page: u32) -> Self {
        let from_page = from_page.max(1);
        Self {
            search: search.into(),
            from_page,
            to_page: to_page.max(from_page),
        }
    }

    /// Builds a query from raw parameters
    ///
    /// Returns `None` when the search term is missing or blank. Non-numeric or
    /// out-of-range page values fall back to their defaults: `from_page` to 1 and
    /// `to_page` to `from_page`.
    pub fn from_params(params: &ScrapeParams) -> Option<Self> {
        let search = params.search.as_deref().map(str::trim).unwrap_or_default();
        if search.is_empty() {
            return None;
        }

        let from_page = parse_page(params.from_page.as_deref()).unwrap_or(1);
        let to_page = parse_page(params.to_page.as_deref()).unwrap_or(from_page);

        Some(Self::new(search, from_page, to_page))
    }

    /// Number of distinct listing pages the crawl may visit
    pub fn page_budget(&self) -> usize {
        self.to_page as usize
    }
}

fn parse_page(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n >= 1)
}
