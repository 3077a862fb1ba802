//! Core types for SafeRoute

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SafeRouteError};

/// A WGS84 latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// A resolved location: coordinates plus the geocoder's display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub position: LatLng,
    pub display_name: String,
}

impl Place {
    pub fn new(lat: f64, lon: f64, display_name: impl Into<String>) -> Self {
        Self {
            position: LatLng::new(lat, lon),
            display_name: display_name.into(),
        }
    }
}

/// A position reading from a device positioning source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceFix {
    pub position: LatLng,
    /// Accuracy radius in meters, when the provider reports one
    pub accuracy_m: Option<f64>,
    /// Name of the provider that produced the fix
    pub source: String,
    pub obtained_at: DateTime<Utc>,
}

impl DeviceFix {
    pub fn new(lat: f64, lon: f64, source: impl Into<String>) -> Self {
        Self {
            position: LatLng::new(lat, lon),
            accuracy_m: None,
            source: source.into(),
            obtained_at: Utc::now(),
        }
    }
}

/// The pair of place names entered for one "find route" action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub id: String,
    pub from: String,
    pub to: String,
}

impl RouteRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Both fields must contain something other than whitespace
    pub fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() || self.to.trim().is_empty() {
            return Err(SafeRouteError::InvalidInput(
                "Please enter both 'From' and 'To' locations.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Map theme: selects tile layer and container styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(format!("Invalid theme: '{}'. Valid options: dark, light", s)),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}
