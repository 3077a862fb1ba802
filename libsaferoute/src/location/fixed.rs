//! Static position providers

use async_trait::async_trait;

use super::PositionSource;
use crate::error::PositionError;
use crate::types::DeviceFix;

/// Reports the same configured coordinate on every read
#[derive(Debug, Clone)]
pub struct FixedPositionSource {
    lat: f64,
    lon: f64,
}

impl FixedPositionSource {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[async_trait]
impl PositionSource for FixedPositionSource {
    async fn current_position(&self, _high_accuracy: bool) -> Result<DeviceFix, PositionError> {
        Ok(DeviceFix::new(self.lat, self.lon, self.name()))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Models a user who refused location access
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedPositionSource;

#[async_trait]
impl PositionSource for DeniedPositionSource {
    async fn current_position(&self, _high_accuracy: bool) -> Result<DeviceFix, PositionError> {
        Err(PositionError::PermissionDenied)
    }

    fn name(&self) -> &str {
        "deny"
    }
}
