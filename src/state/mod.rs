//! State module for crawl inputs, intermediate items, and admission windows
//!
//! # Components
//!
//! - `CrawlQuery`: A validated crawl request (search term and page budget)
//! - `ItemStub`: A harvested listing item awaiting detail enrichment
//! - `ExtractedRecord`: A typed record returned by the extraction service
//! - `ClientWindow`: Per-client request count for fixed-window rate limiting

mod client_window;
mod item;
mod query;

// Re-export main types
pub use client_window::ClientWindow;
pub use item::{ExtractedRecord, ItemStub};
pub use query::{CrawlQuery, ScrapeParams};
