//! Mock router for testing

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use super::{RoutePath, Router};
use crate::error::RoutingError;
use crate::types::LatLng;

/// Router returning a preset outcome
///
/// A successful outcome returns a straight line between the requested
/// waypoints unless an explicit path was configured.
#[derive(Debug, Clone)]
pub struct MockRouter {
    path: Option<RoutePath>,
    failure: Option<RoutingError>,
    delay: Duration,
    calls: Arc<Mutex<Vec<(LatLng, LatLng)>>>,
}

impl MockRouter {
    /// Router that always finds a straight-line route
    pub fn success() -> Self {
        Self {
            path: None,
            failure: None,
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Router that always returns `path`
    pub fn with_path(path: RoutePath) -> Self {
        Self {
            path: Some(path),
            ..Self::success()
        }
    }

    /// Router that always fails with `error`
    pub fn failure(error: RoutingError) -> Self {
        Self {
            failure: Some(error),
            ..Self::success()
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Waypoint pairs requested so far
    pub fn calls(&self) -> Vec<(LatLng, LatLng)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Router for MockRouter {
    async fn route(&self, from: LatLng, to: LatLng) -> Result<RoutePath, RoutingError> {
        self.calls.lock().unwrap().push((from, to));

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        Ok(self.path.clone().unwrap_or_else(|| {
            let mid = LatLng::new((from.lat + to.lat) / 2.0, (from.lon + to.lon) / 2.0);
            RoutePath {
                points: vec![from, mid, to],
                distance_m: 1000.0,
                duration_s: 60.0,
            }
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
