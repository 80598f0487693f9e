//! Fixed-window rate limiting for the scrape endpoint
//!
//! Each client key gets a counter that opens on its first admitted request.
//! A one-shot timer drops the entry once the window has elapsed; admission
//! also treats an entry older than the window as fresh, so a late timer never
//! extends a window.

use crate::config::RateLimitConfig;
use crate::state::ClientWindow;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests, please try again later.";

/// Result of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request fits in the current window
    Allowed { remaining: u32 },

    /// The window is full; the client may retry after the given delay
    Limited { retry_after: Duration },
}

/// Per-client fixed-window request counter
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<String, ClientWindow>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts a request from `key` and decides whether it is admitted
    ///
    /// Must be called from within a tokio runtime; opening a window spawns the
    /// timer that later removes it.
    pub fn check(&self, key: &str) -> Admission {
        let now = Instant::now();
        let mut windows = self.lock();

        let window = windows
            .entry(key.to_string())
            .or_insert_with(|| ClientWindow::open(now));

        if window.is_expired(&self.config, now) {
            *window = ClientWindow::open(now);
        }

        if !window.can_request(&self.config) {
            return Admission::Limited {
                retry_after: window.time_until_reset(&self.config, now),
            };
        }

        let opened = window.request_count == 0;
        window.record_request();
        let remaining = window.requests_remaining(&self.config);
        let started_at = window.started_at;
        drop(windows);

        if opened {
            self.schedule_reset(key.to_string(), started_at);
        }

        Admission::Allowed { remaining }
    }

    /// Whether client keys may come from proxy headers
    pub fn trusts_forwarded_headers(&self) -> bool {
        self.config.trust_forwarded_headers
    }

    /// Number of clients with an open window
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    fn schedule_reset(&self, key: String, started_at: Instant) {
        let windows = Arc::clone(&self.windows);
        let window = Duration::from_millis(self.config.window_ms);

        let Some(deadline) = started_at.checked_add(window) else {
            // Admission still resets the window lazily
            tracing::debug!(client = %key, "Window end out of clock range, no reset timer");
            return;
        };

        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut windows = windows.lock().unwrap_or_else(PoisonError::into_inner);
            // A newer window for the same key has its own timer
            if windows.get(&key).is_some_and(|w| w.started_at == started_at) {
                windows.remove(&key);
                tracing::trace!(client = %key, "Rate limit window reset");
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ClientWindow>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Identifies the client behind a request
///
/// With `trust_forwarded` unset the socket peer is the only source, so a
/// client cannot pick its own key. With it set, priority is:
/// 1. X-Forwarded-For header (first entry)
/// 2. X-Real-IP header
/// 3. ConnectInfo socket address
///
/// Falls back to `"unknown"` when no source yields an address.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    let from_headers = if trust_forwarded {
        forwarded().or_else(real_ip)
    } else {
        None
    };

    from_headers
        .or_else(|| peer.map(|addr| addr.ip()))
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware rejecting over-quota requests before they reach the handler
pub async fn limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer, limiter.trusts_forwarded_headers());

    match limiter.check(&key) {
        Admission::Allowed { remaining } => {
            tracing::debug!(client = %key, remaining, "Request admitted");
            next.run(request).await
        }
        Admission::Limited { retry_after } => {
            tracing::warn!(client = %key, retry_after = ?retry_after, "Rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "success": false, "message": TOO_MANY_REQUESTS_MESSAGE })),
            )
                .into_response()
        }
    }
}
