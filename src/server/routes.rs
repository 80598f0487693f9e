//! Route handlers

use crate::crawler::{extract_items, Coordinator};
use crate::server::AppState;
use crate::state::{CrawlQuery, ExtractedRecord, ScrapeParams};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "success": true }))
}

/// `GET /scrape?search=..&from_page=..&to_page=..`
///
/// A blank search answers with an empty array without touching any
/// collaborator. Pipeline failures surface as 500 with the error message.
pub async fn scrape(State(state): State<AppState>, Query(params): Query<ScrapeParams>) -> Response {
    let Some(query) = CrawlQuery::from_params(&params) else {
        tracing::debug!("Scrape request without a search term");
        return Json(Vec::<ExtractedRecord>::new()).into_response();
    };

    let mut surface = state.surface.lock().await;
    let collected = Coordinator::new(&state.config, &mut **surface)
        .collect(&query)
        .await;
    // Extraction does not navigate; let the next crawl start
    drop(surface);

    match collected {
        Ok(stubs) => {
            let records = extract_items(&state.config, &*state.extractor, stubs).await;
            Json(records).into_response()
        }
        Err(e) => {
            tracing::error!(search = %query.search, error = %e, "Scrape failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Fallback for unknown paths
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Not Found." })),
    )
        .into_response()
}
