//! Request spacing for public web services
//!
//! The public Nominatim and OSRM endpoints both ask clients to stay below a
//! fixed request rate. Each backend owns one limiter that enforces a
//! minimum interval between two of its requests.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Minimum spacing between requests to one service
pub struct RateLimiter {
    /// Service name, for logging
    service: String,
    min_interval: Duration,
    /// Time of the last granted request
    last_granted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// A zero `min_interval` disables spacing
    pub fn new(service: &str, min_interval: Duration) -> Self {
        Self {
            service: service.to_string(),
            min_interval,
            last_granted: Mutex::new(None),
        }
    }

    /// Wait until the next request is allowed, then record it
    ///
    /// Concurrent callers are granted one at a time, each at least the
    /// configured interval after the previous one.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last_granted = self.last_granted.lock().await;
        if let Some(previous) = *last_granted {
            let ready_at = previous + self.min_interval;
            if Instant::now() < ready_at {
                debug!("Rate limiting {} for {:?}", self.service, ready_at - Instant::now());
                sleep_until(ready_at).await;
            }
        }
        *last_granted = Some(Instant::now());
    }
}
