use crate::config::RateLimitConfig;
use std::time::Duration;
use tokio::time::Instant;

/// Tracks one client's usage within the current fixed window
///
/// The window opens on the client's first admitted request and is discarded
/// wholesale once `window_ms` has elapsed; counts are never decremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientWindow {
    /// Number of requests admitted in this window
    pub request_count: u32,

    /// When the first request of this window was admitted
    pub started_at: Instant,
}

impl ClientWindow {
    /// Opens a fresh window with no requests counted yet
    pub fn open(now: Instant) -> Self {
        Self {
            request_count: 0,
            started_at: now,
        }
    }

    /// Returns true once the window has run its full length
    pub fn is_expired(&self, config: &RateLimitConfig, now: Instant) -> bool {
        now.duration_since(self.started_at) >= Duration::from_millis(config.window_ms)
    }

    /// Checks whether another request fits in this window
    pub fn can_request(&self, config: &RateLimitConfig) -> bool {
        self.request_count < config.max_requests
    }

    /// Records an admitted request
    pub fn record_request(&mut self) {
        self.request_count += 1;
    }

    /// Returns the number of requests still admissible in this window
    pub fn requests_remaining(&self, config: &RateLimitConfig) -> u32 {
        config.max_requests.saturating_sub(self.request_count)
    }

    /// Time left until this window resets
    pub fn time_until_reset(&self, config: &RateLimitConfig, now: Instant) -> Duration {
        Duration::from_millis(config.window_ms).saturating_sub(now.duration_since(self.started_at))
    }
}
