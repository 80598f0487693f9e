//! HTTP ingress
//!
//! Exposes the crawl pipeline over a small axum router:
//! - `GET /health` liveness probe
//! - `GET /scrape` runs one crawl, behind the per-client rate limiter
//! - everything else answers 404

mod rate_limit;
mod routes;

pub use rate_limit::{client_key, limit_requests, Admission, RateLimiter, TOO_MANY_REQUESTS_MESSAGE};

use crate::config::Config;
use crate::extraction::{ExtractionClient, OpenAiExtractionClient};
use crate::render::{HttpRenderSurface, RenderSurface};
use crate::HarvestError;
use axum::routing::get;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

/// Render surface shared by all requests; one crawl holds it at a time
pub type SharedSurface = Arc<Mutex<Box<dyn RenderSurface>>>;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub surface: SharedSurface,
    pub extractor: Arc<dyn ExtractionClient>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Assembles state from explicit collaborators
    pub fn new(
        config: Config,
        surface: Box<dyn RenderSurface>,
        extractor: Arc<dyn ExtractionClient>,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        Self {
            config: Arc::new(config),
            surface: Arc::new(Mutex::new(surface)),
            extractor,
            limiter,
        }
    }

    /// Builds the HTTP render surface and extraction client from configuration
    pub fn from_config(config: Config) -> Result<Self, HarvestError> {
        let surface = HttpRenderSurface::new(&config.crawler)?;
        let extractor = OpenAiExtractionClient::new(&config.extraction)?;
        Ok(Self::new(config, Box::new(surface), Arc::new(extractor)))
    }
}

/// Builds the application router
pub fn build_router(state: AppState) -> Router {
    let scrape_routes = Router::new()
        .route("/scrape", get(routes::scrape))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.limiter),
            limit_requests,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .merge(scrape_routes)
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C
pub async fn serve(config: Config) -> Result<(), HarvestError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState::from_config(config)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::crawler::testing::StaticSurface;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    /// Records whether the render surface was free while extraction ran
    struct SurfaceWatcher {
        surface: SharedSurface,
        saw_free_surface: AtomicBool,
    }

    #[async_trait]
    impl ExtractionClient for SurfaceWatcher {
        async fn complete(&self, _schema: &Value, _document: &str) -> Result<Value, HarvestError> {
            let free = self.surface.try_lock().is_ok();
            self.saw_free_surface.store(free, Ordering::SeqCst);
            Ok(json!({ "products": [{ "name": "a", "price": 1.0, "description": "" }] }))
        }
    }

    #[tokio::test]
    async fn test_surface_released_before_extraction() {
        let mut config = Config::default();
        config.site.listing_url = "https://shop.test/search".to_string();
        config.site.item_selector = "div.card".to_string();

        let pages: Box<dyn RenderSurface> = Box::new(StaticSurface::new().page(
            "https://shop.test/search?q=nike&page=1",
            r#"<div class="card"><a href="/product/a">a</a></div>"#,
        ));
        let surface: SharedSurface = Arc::new(Mutex::new(pages));
        let watcher = Arc::new(SurfaceWatcher {
            surface: Arc::clone(&surface),
            saw_free_surface: AtomicBool::new(false),
        });

        let state = AppState {
            config: Arc::new(config),
            surface,
            extractor: watcher.clone(),
            limiter: Arc::new(RateLimiter::new(RateLimitConfig::default())),
        };

        let request = Request::builder()
            .uri("/scrape?search=nike")
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(watcher.saw_free_surface.load(Ordering::SeqCst));
    }
}
