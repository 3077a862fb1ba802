//! Mock position source for testing

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use super::PositionSource;
use crate::error::PositionError;
use crate::types::DeviceFix;

#[derive(Debug, Clone)]
pub struct MockPositionSource {
    outcome: Result<(f64, f64), PositionError>,
    delay: Duration,
    calls: Arc<Mutex<usize>>,
}

impl MockPositionSource {
    /// Source that always reports (`lat`, `lon`)
    pub fn fix(lat: f64, lon: f64) -> Self {
        Self {
            outcome: Ok((lat, lon)),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Source that always fails with `error`
    pub fn error(error: PositionError) -> Self {
        Self {
            outcome: Err(error),
            ..Self::fix(0.0, 0.0)
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PositionSource for MockPositionSource {
    async fn current_position(&self, _high_accuracy: bool) -> Result<DeviceFix, PositionError> {
        *self.calls.lock().unwrap() += 1;

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.outcome
            .map(|(lat, lon)| DeviceFix::new(lat, lon, "mock"))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
