//! Extraction dispatcher
//!
//! All batches of one crawl are sent to the extraction service concurrently
//! and joined with all-settled semantics: every outcome is collected, failed
//! or malformed batches contribute nothing, and the surviving records are
//! merged in batch submission order regardless of completion order.

use crate::extraction::batcher::Batch;
use crate::extraction::client::ExtractionClient;
use crate::extraction::schema::{parse_records, record_schema};
use crate::state::ExtractedRecord;
use crate::HarvestError;
use futures::future::join_all;
use std::time::Duration;

/// Settled result of one batch's extraction call
#[derive(Debug)]
pub enum BatchOutcome {
    /// The call succeeded and the response matched the schema
    Extracted(Vec<ExtractedRecord>),

    /// The call succeeded but the response was unusable
    Malformed(String),

    /// The call failed or timed out
    Failed(HarvestError),
}

impl BatchOutcome {
    /// Records this batch contributes to the aggregate output
    pub fn into_records(self) -> Vec<ExtractedRecord> {
        match self {
            Self::Extracted(records) => records,
            Self::Malformed(_) | Self::Failed(_) => Vec::new(),
        }
    }

    pub fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted(_))
    }
}

/// Issues one extraction call per batch and settles every call
///
/// The returned outcomes are indexed by batch submission order. No call is
/// retried.
///
/// # Arguments
///
/// * `client` - The extraction service
/// * `batches` - Batches in submission order
/// * `timeout` - Upper bound for each call
pub async fn dispatch_settled<E>(client: &E, batches: &[Batch], timeout: Duration) -> Vec<BatchOutcome>
where
    E: ExtractionClient + ?Sized,
{
    let schema = record_schema();

    let calls = batches.iter().map(|batch| {
        let schema = &schema;
        async move {
            let document = batch.document();
            let outcome = match tokio::time::timeout(timeout, client.complete(schema, &document)).await {
                Err(_) => BatchOutcome::Failed(HarvestError::Service(format!(
                    "no response within {:?}",
                    timeout
                ))),
                Ok(Err(HarvestError::MalformedResponse(reason))) => BatchOutcome::Malformed(reason),
                Ok(Err(e)) => BatchOutcome::Failed(e),
                Ok(Ok(value)) => match parse_records(&value) {
                    Ok(records) => BatchOutcome::Extracted(records),
                    Err(e) => BatchOutcome::Malformed(e.to_string()),
                },
            };

            match &outcome {
                BatchOutcome::Extracted(records) => tracing::debug!(
                    batch = batch.index,
                    items = batch.len(),
                    records = records.len(),
                    "Batch extracted"
                ),
                BatchOutcome::Malformed(reason) => tracing::warn!(
                    batch = batch.index,
                    reason = %reason,
                    "Batch response unusable, contributing no records"
                ),
                BatchOutcome::Failed(e) => tracing::warn!(
                    batch = batch.index,
                    error = %e,
                    "Batch extraction failed, contributing no records"
                ),
            }

            outcome
        }
    });

    join_all(calls).await
}

/// Concatenates settled outcomes into the flat record list
pub fn merge_outcomes(outcomes: Vec<BatchOutcome>) -> Vec<ExtractedRecord> {
    outcomes
        .into_iter()
        .flat_map(BatchOutcome::into_records)
        .collect()
}

/// Extracts every batch and returns the merged records
pub async fn dispatch<E>(client: &E, batches: &[Batch], timeout: Duration) -> Vec<ExtractedRecord>
where
    E: ExtractionClient + ?Sized,
{
    let outcomes = dispatch_settled(client, batches, timeout).await;
    let settled = outcomes.len();
    let extracted = outcomes.iter().filter(|o| o.is_extracted()).count();

    let records = merge_outcomes(outcomes);
    tracing::info!(
        batches = settled,
        succeeded = extracted,
        records = records.len(),
        "Extraction settled"
    );

    records
}
