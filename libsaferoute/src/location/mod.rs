//! Device positioning
//!
//! A [`PositionSource`] yields the device's current position or one of the
//! three [`PositionError`] codes. The [`Locator`] wraps a source with the
//! read options used by the broadcasters: a hard timeout and an optional
//! cached-fix age.
//!
//! Providers:
//! - [`ip::IpPositionSource`]: approximate position from an IP geolocation
//!   service
//! - [`fixed::FixedPositionSource`]: a configured coordinate
//! - [`fixed::DeniedPositionSource`]: always refuses access
//! - [`mock::MockPositionSource`]: preset outcomes for tests

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{LocationConfig, LocationProvider};
use crate::error::{PositionError, Result};
use crate::types::DeviceFix;

pub mod fixed;
pub mod ip;
pub mod mock;

#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Read the current position
    ///
    /// `high_accuracy` is a hint; providers that cannot honour it ignore it.
    async fn current_position(&self, high_accuracy: bool) -> std::result::Result<DeviceFix, PositionError>;

    fn name(&self) -> &str;
}

/// Options for a single position read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that may be returned instead of a fresh read.
    /// Zero disables the cache.
    pub maximum_age: Duration,
}

impl PositionOptions {
    pub fn share(timeout: Duration, maximum_age: Duration) -> Self {
        Self {
            high_accuracy: true,
            timeout,
            maximum_age,
        }
    }

    /// Fresh reads only
    pub fn sos(timeout: Duration) -> Self {
        Self {
            high_accuracy: true,
            timeout,
            maximum_age: Duration::ZERO,
        }
    }
}

/// Bounded position reads with a last-fix cache
///
/// A locator without a source models a device with no positioning
/// capability at all; callers check [`Locator::is_supported`] first.
#[derive(Clone)]
pub struct Locator {
    source: Option<Arc<dyn PositionSource>>,
    last_fix: Arc<Mutex<Option<DeviceFix>>>,
}

impl Locator {
    pub fn new(source: Arc<dyn PositionSource>) -> Self {
        Self {
            source: Some(source),
            last_fix: Arc::new(Mutex::new(None)),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            source: None,
            last_fix: Arc::new(Mutex::new(None)),
        }
    }

    /// Build the locator selected by the `[location]` config section
    pub fn from_config(config: &LocationConfig) -> Result<Self> {
        let locator = match config.provider {
            LocationProvider::Ip => Self::new(Arc::new(ip::IpPositionSource::new(&config.ip_endpoint)?)),
            LocationProvider::Fixed => {
                let (lat, lon) = match (config.latitude, config.longitude) {
                    (Some(lat), Some(lon)) => (lat, lon),
                    _ => {
                        return Err(crate::error::ConfigError::MissingField(
                            "location.latitude and location.longitude".to_string(),
                        )
                        .into())
                    }
                };
                Self::new(Arc::new(fixed::FixedPositionSource::new(lat, lon)))
            }
            LocationProvider::Deny => Self::new(Arc::new(fixed::DeniedPositionSource)),
            LocationProvider::None => Self::unsupported(),
        };
        debug!("Position source: {}", locator.source_name().unwrap_or("none"));
        Ok(locator)
    }

    pub fn is_supported(&self) -> bool {
        self.source.is_some()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source.as_deref().map(|s| s.name())
    }

    /// Read the position under `options`
    ///
    /// Returns the cached fix when it is younger than `maximum_age`.
    /// Otherwise the source is queried and a read exceeding `timeout` yields
    /// [`PositionError::Timeout`]. An unsupported locator reports
    /// [`PositionError::PositionUnavailable`].
    pub async fn locate(&self, options: PositionOptions) -> std::result::Result<DeviceFix, PositionError> {
        let Some(source) = self.source.as_ref() else {
            return Err(PositionError::PositionUnavailable);
        };

        if let Some(fix) = self.cached(options.maximum_age) {
            debug!("Using cached fix from {}", fix.obtained_at);
            return Ok(fix);
        }

        match tokio::time::timeout(options.timeout, source.current_position(options.high_accuracy)).await {
            Ok(Ok(fix)) => {
                info!(
                    lat = fix.position.lat,
                    lon = fix.position.lon,
                    "Position obtained from {}",
                    source.name()
                );
                *lock(&self.last_fix) = Some(fix.clone());
                Ok(fix)
            }
            Ok(Err(e)) => {
                warn!("Position read from {} failed: {}", source.name(), e);
                Err(e)
            }
            Err(_) => {
                warn!("Position read from {} timed out after {:?}", source.name(), options.timeout);
                Err(PositionError::Timeout)
            }
        }
    }

    fn cached(&self, maximum_age: Duration) -> Option<DeviceFix> {
        if maximum_age.is_zero() {
            return None;
        }
        let guard = lock(&self.last_fix);
        let fix = guard.as_ref()?;
        let age = (Utc::now() - fix.obtained_at).to_std().unwrap_or(Duration::ZERO);
        (age <= maximum_age).then(|| fix.clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
