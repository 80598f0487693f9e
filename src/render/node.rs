//! DOM query results
//!
//! A `RenderedNode` is the serialized form of one matched element: its outer
//! HTML, its attributes, and the hrefs of the anchors it contains. It owns all
//! of its data so it can be carried across suspension points.

use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};

/// Serialized view of a single matched element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedNode {
    /// Outer HTML of the element
    pub html: String,

    /// Element attributes in document order
    pub attributes: Vec<(String, String)>,

    /// Raw `href` values of the element (if it is an anchor) and of its descendant anchors
    pub links: Vec<String>,
}

impl RenderedNode {
    /// Returns the value of an attribute, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the node's own href, falling back to its first descendant anchor
    pub fn first_link(&self) -> Option<&str> {
        self.links.first().map(String::as_str)
    }

    fn from_element(element: ElementRef<'_>, anchor: &Selector) -> Self {
        let attributes = element
            .value()
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut links = Vec::new();
        if element.value().name() == "a" {
            if let Some(href) = element.value().attr("href") {
                links.push(href.to_string());
            }
        }
        links.extend(
            element
                .select(anchor)
                .filter_map(|a| a.value().attr("href"))
                .map(str::to_string),
        );

        Self {
            html: element.html(),
            attributes,
            links,
        }
    }
}

/// Parses a selector, mapping failures into the crate error type
pub fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector)
        .map_err(|e| HarvestError::Selector(format!("'{}': {:?}", selector, e)))
}

/// Runs a selector over an HTML document and serializes every match
///
/// Zero matches yield an empty vector, never an error.
///
/// # Example
///
/// ```
/// use shelf_harvest::render::select_nodes;
///
/// let html = r#"<div class="card"><a href="/product/a">A</a></div>"#;
/// let nodes = select_nodes(html, "div.card").unwrap();
/// assert_eq!(nodes[0].first_link(), Some("/product/a"));
/// ```
pub fn select_nodes(html: &str, selector: &str) -> Result<Vec<RenderedNode>, HarvestError> {
    let selector = parse_selector(selector)?;
    let anchor = parse_selector("a[href]")?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|element| RenderedNode::from_element(element, &anchor))
        .collect())
}
