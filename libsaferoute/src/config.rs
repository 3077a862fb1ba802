//! Configuration management for SafeRoute
//!
//! Every section is optional; missing sections and fields take the built-in
//! defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::types::{LatLng, Theme};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geocoding: GeocodingConfig,
    pub routing: RoutingConfig,
    pub map: MapConfig,
    pub safety: SafetyConfig,
    pub share: ShareConfig,
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub endpoint: String,
    /// Country name appended to queries that do not mention it
    pub country: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Minimum spacing between two requests to the endpoint
    pub min_interval_ms: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            country: "India".to_string(),
            user_agent: "SafeRoute/0.1 (route-sharing)".to_string(),
            timeout_secs: 10,
            min_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub service_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    /// Minimum spacing between two requests to the service
    pub min_interval_ms: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            service_url: "https://router.project-osrm.org/route/v1".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 30,
            min_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Initial view center as [lat, lon]
    pub center: [f64; 2],
    pub zoom: u8,
    /// Viewport size in pixels as [width, height]
    pub viewport: [u32; 2],
    pub theme: Theme,
    /// Padding in pixels applied on every side when fitting bounds
    pub fit_padding: u32,
    /// Maximum zoom when fitting a found route
    pub route_max_zoom: u8,
    pub circle_radius_m: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [20.5937, 78.9629],
            zoom: 5,
            viewport: [1024, 768],
            theme: Theme::Dark,
            fit_padding: 50,
            route_max_zoom: 16,
            circle_radius_m: 500.0,
        }
    }
}

impl MapConfig {
    pub fn center(&self) -> LatLng {
        LatLng::new(self.center[0], self.center[1])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub delay_ms: u64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self { delay_ms: 1500 }
    }
}

impl SafetyConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Name used in message templates
    pub app_name: String,
    pub maps_base: String,
    pub share_timeout_ms: u64,
    /// Oldest cached fix accepted when sharing (SOS never uses a cached fix)
    pub share_max_age_ms: u64,
    pub share_sms_delay_ms: u64,
    pub sos_timeout_ms: u64,
    pub sos_sms_delay_ms: u64,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            app_name: "SafeRoute".to_string(),
            maps_base: "https://maps.google.com/".to_string(),
            share_timeout_ms: 10_000,
            share_max_age_ms: 30_000,
            share_sms_delay_ms: 1500,
            sos_timeout_ms: 15_000,
            sos_sms_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    /// Approximate position from an IP geolocation service
    Ip,
    /// The configured latitude/longitude
    Fixed,
    /// Location access is refused
    Deny,
    /// No positioning capability at all
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub provider: LocationProvider,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_endpoint: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider: LocationProvider::Ip,
            latitude: None,
            longitude: None,
            ip_endpoint: "https://ipapi.co/json/".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from the default location, falling back to the
    /// built-in defaults when no file exists there
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load `path` when given (it must exist), otherwise behave like
    /// [`Config::load_or_default`]
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load_or_default(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.location.provider == LocationProvider::Fixed
            && (self.location.latitude.is_none() || self.location.longitude.is_none())
        {
            return Err(ConfigError::MissingField(
                "location.latitude and location.longitude".to_string(),
            )
            .into());
        }

        let [lat, lon] = self.map.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ConfigError::InvalidValue {
                field: "map.center".to_string(),
                reason: format!("{}, {} is not a valid coordinate", lat, lon),
            }
            .into());
        }

        if self.map.viewport[0] == 0 || self.map.viewport[1] == 0 {
            return Err(ConfigError::InvalidValue {
                field: "map.viewport".to_string(),
                reason: "width and height must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Resolve the configuration file path: `$SAFEROUTE_CONFIG`, else the XDG config dir
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("SAFEROUTE_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("saferoute").join("config.toml"))
}
