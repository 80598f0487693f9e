/// Item records flowing through the crawl-and-extract pipeline
use serde::{Deserialize, Serialize};

/// A listing item awaiting detail enrichment
///
/// Created by the listing harvester with `detail_html = None`; the detail
/// fetcher fills it in or leaves it empty when the detail page fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStub {
    /// Identifier derived from the detail link's path
    pub id: String,

    /// Raw HTML of the listing container
    pub summary_html: String,

    /// Absolute URL of the item's detail page
    pub detail_link: String,

    /// HTML of the detail content region, if it was fetched
    pub detail_html: Option<String>,
}

impl ItemStub {
    pub fn new(
        id: impl Into<String>,
        summary_html: impl Into<String>,
        detail_link: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            summary_html: summary_html.into(),
            detail_link: detail_link.into(),
            detail_html: None,
        }
    }

    /// Returns true once detail content has been attached
    pub fn is_enriched(&self) -> bool {
        self.detail_html.is_some()
    }
}

/// A typed record produced by the extraction service
///
/// The pipeline never rewrites these fields; records are only concatenated
/// into the response in batch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub name: String,
    pub price: f64,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stub_is_not_enriched() {
        let stub = ItemStub::new("sku-1", "<div>Shoe</div>", "https://x.com/product/sku-1");
        assert_eq!(stub.id, "sku-1");
        assert!(!stub.is_enriched());
    }

    #[test]
    fn test_record_deserializes_from_service_shape() {
        let record: ExtractedRecord = serde_json::from_str(
            r#"{"name":"Air Max","price":129.99,"description":"Running shoe"}"#,
        )
        .unwrap();
        assert_eq!(record.name, "Air Max");
        assert_eq!(record.price, 129.99);
    }

    #[test]
    fn test_record_missing_field_is_rejected() {
        let result = serde_json::from_str::<ExtractedRecord>(r#"{"name":"Air Max"}"#);
        assert!(result.is_err());
    }
}
