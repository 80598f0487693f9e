//! Extraction module: batching, the service client, and concurrent dispatch
//!
//! Harvested stubs are grouped into bounded batches, each rendered into one
//! composite HTML document, then sent to the structured-extraction service in
//! parallel. Results are reconciled into a flat record list.

mod batcher;
mod client;
mod dispatcher;
mod schema;

pub use batcher::{build_batches, estimate_tokens, Batch};
pub use client::{ExtractionClient, OpenAiExtractionClient};
pub use dispatcher::{dispatch, dispatch_settled, merge_outcomes, BatchOutcome};
pub use schema::{parse_records, record_schema, RECORDS_FIELD};
