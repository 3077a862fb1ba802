//! Path computation between two waypoints
//!
//! The map delegates route finding to a [`Router`]. Each call ends in
//! exactly one of two outcomes: a [`RoutePath`] ("routes found") or a
//! [`RoutingError`] ("routing error").

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::types::LatLng;

pub mod mock;
pub mod osrm;

/// A computed route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    /// Path geometry from origin to destination
    pub points: Vec<LatLng>,
    /// Total length in meters
    pub distance_m: f64,
    /// Expected travel time in seconds
    pub duration_s: f64,
}

impl RoutePath {
    /// Short human-readable summary, e.g. "148.2 km, 2 h 51 min"
    pub fn summary(&self) -> String {
        let minutes = (self.duration_s / 60.0).round() as u64;
        let time = if minutes >= 60 {
            format!("{} h {} min", minutes / 60, minutes % 60)
        } else {
            format!("{} min", minutes)
        };
        format!("{:.1} km, {}", self.distance_m / 1000.0, time)
    }
}

#[async_trait]
pub trait Router: Send + Sync {
    /// Compute a route through exactly the two given waypoints
    ///
    /// # Errors
    ///
    /// Returns a [`RoutingError`] when the service is unreachable or no route
    /// connects the waypoints.
    async fn route(&self, from: LatLng, to: LatLng) -> Result<RoutePath, RoutingError>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_formatting() {
        let path = RoutePath {
            points: vec![],
            distance_m: 148_230.0,
            duration_s: 10_260.0,
        };
        assert_eq!(path.summary(), "148.2 km, 2 h 51 min");

        let short = RoutePath {
            points: vec![],
            distance_m: 2_500.0,
            duration_s: 400.0,
        };
        assert_eq!(short.summary(), "2.5 km, 7 min");
    }
}
