//! Integration tests for the scrape server
//!
//! These tests use wiremock to stand in for the listing site and the
//! extraction service, and drive the axum router directly with `oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use shelf_harvest::config::Config;
use shelf_harvest::server::{build_router, AppState};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

/// Answers chat-completion requests with one product per `data-item-id` in the document
struct EchoExtraction;

impl Respond for EchoExtraction {
    fn respond(&self, request: &wiremock::Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let document = body["messages"][1]["content"].as_str().unwrap_or_default();

        let products: Vec<Value> = document
            .split("data-item-id=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(|id| {
                json!({
                    "name": format!("Product {}", id),
                    "price": 49.99,
                    "description": format!("Extracted from {}", id),
                })
            })
            .collect();

        let content = json!({ "products": products }).to_string();
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }
}

/// Creates a test configuration pointing every collaborator at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.listing_url = format!("{}/search", base_url);
    config.extraction.base_url = format!("{}/v1", base_url);
    config.extraction.api_key = "sk-test".to_string();
    config.extraction.items_per_batch = 5;
    config.crawler.navigation_timeout_ms = 5_000;
    config.extraction.request_timeout_ms = 5_000;
    config
}

fn create_app(config: Config) -> Router {
    build_router(AppState::from_config(config).expect("Failed to build app state"))
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body).into_bytes(),
        "text/html",
    )
}

fn listing_page(items: &[&str], pages: &[u32]) -> ResponseTemplate {
    let cards: String = items
        .iter()
        .map(|id| {
            format!(
                r#"<div class="product-card"><a href="/product/{id}"><h2>{id}</h2></a><span>$49.99</span></div>"#
            )
        })
        .collect();
    let links: String = pages
        .iter()
        .map(|p| format!(r#"<a href="/search?q=nike&page={p}">{p}</a>"#))
        .collect();
    html(format!(r#"{cards}<nav class="pagination">{links}</nav>"#))
}

fn detail_page(id: &str) -> ResponseTemplate {
    html(format!(
        r#"<div class="product-details"><p>Full description of {}</p></div>"#,
        id
    ))
}

async fn mount_listing(server: &MockServer, page: u32, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "nike"))
        .and(query_param("page", page.to_string()))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/product/{}", id)))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_extraction(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(EchoExtraction)
        .mount(server)
        .await;
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.10")
        .body(Body::empty())
        .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_scrape_single_page_end_to_end() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, listing_page(&["sku-1", "sku-2"], &[1, 2])).await;
    mount_detail(&mock_server, "sku-1", detail_page("sku-1")).await;
    mount_detail(&mock_server, "sku-2", detail_page("sku-2")).await;
    mount_extraction(&mock_server).await;

    let app = create_app(create_test_config(&mock_server.uri()));
    let (status, body) = get(&app, "/scrape?search=nike&from_page=1&to_page=1").await;

    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().expect("Expected a JSON array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "Product sku-1");
    assert_eq!(records[1]["name"], "Product sku-2");
    assert_eq!(records[0]["price"], 49.99);

    // One extraction call for both items, carrying the detail content
    let requests = mock_server.received_requests().await.unwrap();
    let extraction_calls: Vec<&wiremock::Request> = requests
        .iter()
        .filter(|r| r.url.path() == "/v1/chat/completions")
        .collect();
    assert_eq!(extraction_calls.len(), 1);
    let payload = String::from_utf8_lossy(&extraction_calls[0].body);
    assert!(payload.contains("Full description of sku-1"));
    assert!(payload.contains("Full description of sku-2"));
}

#[tokio::test]
async fn test_scrape_respects_page_budget() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, listing_page(&["sku-1"], &[2, 3])).await;
    mount_listing(&mock_server, 2, listing_page(&["sku-2"], &[1, 3])).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "3"))
        .respond_with(listing_page(&["sku-3"], &[]))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_detail(&mock_server, "sku-1", detail_page("sku-1")).await;
    mount_detail(&mock_server, "sku-2", detail_page("sku-2")).await;
    mount_extraction(&mock_server).await;

    let app = create_app(create_test_config(&mock_server.uri()));
    let (status, body) = get(&app, "/scrape?search=nike&from_page=1&to_page=2").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Product sku-1", "Product sku-2"]);
}

#[tokio::test]
async fn test_failed_detail_page_keeps_item() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, listing_page(&["sku-1", "sku-2"], &[])).await;
    mount_detail(&mock_server, "sku-1", detail_page("sku-1")).await;
    mount_detail(&mock_server, "sku-2", ResponseTemplate::new(500)).await;
    mount_extraction(&mock_server).await;

    let app = create_app(create_test_config(&mock_server.uri()));
    let (status, body) = get(&app, "/scrape?search=nike").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_extraction_yields_empty_result() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, listing_page(&["sku-1"], &[])).await;
    mount_detail(&mock_server, "sku-1", detail_page("sku-1")).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let app = create_app(create_test_config(&mock_server.uri()));
    let (status, body) = get(&app, "/scrape?search=nike").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_empty_search_makes_no_calls() {
    let mock_server = MockServer::start().await;

    let app = create_app(create_test_config(&mock_server.uri()));
    let (status, body) = get(&app, "/scrape?search=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sixth_request_is_rate_limited() {
    let mock_server = MockServer::start().await;

    let app = create_app(create_test_config(&mock_server.uri()));
    for _ in 0..5 {
        let (status, _) = get(&app, "/scrape?search=").await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&app, "/scrape?search=").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Too many requests, please try again later.");

    // Health checks are not counted
    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unusable_listing_url_is_server_error() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri());
    config.site.listing_url = "not a url".to_string();

    let app = create_app(config);
    let (status, body) = get(&app, "/scrape?search=nike").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn test_health() {
    let app = create_app(create_test_config("http://127.0.0.1:9"));
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let app = create_app(create_test_config("http://127.0.0.1:9"));
    let (status, body) = get(&app, "/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Not Found." }));
}
