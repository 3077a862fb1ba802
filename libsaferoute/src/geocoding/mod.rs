//! Location resolution: free-text place names to coordinates
//!
//! A [`Geocoder`] performs the raw lookup against some service. The
//! [`LocationResolver`] wraps one and applies the resolution contract used by
//! the route workflow: the target country is appended to queries that do not
//! mention it, only the first match is used, and every failure (no results,
//! network trouble, a malformed response) is reported as plain absence.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use libsaferoute::config::GeocodingConfig;
//! use libsaferoute::geocoding::{LocationResolver, nominatim::NominatimGeocoder};
//!
//! # async fn example() -> libsaferoute::Result<()> {
//! let config = GeocodingConfig::default();
//! let geocoder = NominatimGeocoder::new(&config)?;
//! let resolver = LocationResolver::new(Arc::new(geocoder), &config.country);
//!
//! match resolver.resolve("Mumbai").await {
//!     Some(place) => println!("{} at {}", place.display_name, place.position),
//!     None => println!("not found"),
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::GeocodingError;
use crate::types::Place;

pub mod mock;
pub mod nominatim;

/// One candidate returned by a geocoding service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

impl From<GeocodeMatch> for Place {
    fn from(m: GeocodeMatch) -> Self {
        Place::new(m.lat, m.lon, m.display_name)
    }
}

/// Raw geocoding lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Search for `query` exactly as given, returning matches in service order
    ///
    /// # Errors
    ///
    /// Returns a [`GeocodingError`] when the service cannot be reached or
    /// answers with something other than a list of matches.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>, GeocodingError>;

    /// Lowercase identifier for logs (e.g. "nominatim")
    fn name(&self) -> &str;
}

/// Append `", <country>"` unless the query already mentions the country
///
/// The check is a case-insensitive substring match. An empty country leaves
/// every query untouched.
pub fn qualify_query(query: &str, country: &str) -> String {
    if country.is_empty() || query.to_lowercase().contains(&country.to_lowercase()) {
        query.to_string()
    } else {
        format!("{}, {}", query, country)
    }
}

/// Resolves place names, treating "not found" as an ordinary outcome
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    country: String,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, country: &str) -> Self {
        Self {
            geocoder,
            country: country.to_string(),
        }
    }

    /// Resolve `query` to the first match, or `None`
    ///
    /// Never returns an error: lookup failures are logged and reported as
    /// absence.
    pub async fn resolve(&self, query: &str) -> Option<Place> {
        let qualified = qualify_query(query, &self.country);
        debug!("Geocoding {:?} via {}", qualified, self.geocoder.name());

        match self.geocoder.search(&qualified).await {
            Ok(matches) => match matches.into_iter().next() {
                Some(first) => {
                    info!(
                        lat = first.lat,
                        lon = first.lon,
                        "Resolved {:?} to {}",
                        query,
                        first.display_name
                    );
                    Some(first.into())
                }
                None => {
                    info!("No geocoding results for {:?}", qualified);
                    None
                }
            },
            Err(e) => {
                warn!("Geocoding error for {:?}: {}", qualified, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockGeocoder;
    use super::*;

    #[test]
    fn test_qualify_query_appends_country() {
        assert_eq!(qualify_query("Mumbai", "India"), "Mumbai, India");
        assert_eq!(qualify_query("Connaught Place", "India"), "Connaught Place, India");
    }

    #[test]
    fn test_qualify_query_keeps_existing_country() {
        assert_eq!(qualify_query("Pune, India", "India"), "Pune, India");
        assert_eq!(qualify_query("GOA INDIA", "India"), "GOA INDIA");
        assert_eq!(qualify_query("india gate", "India"), "india gate");
    }

    #[test]
    fn test_qualify_query_without_country() {
        assert_eq!(qualify_query("Kathmandu", ""), "Kathmandu");
    }

    #[tokio::test]
    async fn test_resolver_returns_first_match() {
        let geocoder = MockGeocoder::new()
            .with_place("Pune", 18.5204, 73.8567, "Pune, Maharashtra, India")
            .with_place("Pune", 10.0, 10.0, "Some other Pune");
        let resolver = LocationResolver::new(Arc::new(geocoder.clone()), "India");

        let place = resolver.resolve("Pune").await.unwrap();
        assert_eq!(place.display_name, "Pune, Maharashtra, India");
        assert_eq!(place.position.lat, 18.5204);
        assert_eq!(geocoder.queries(), vec!["Pune, India".to_string()]);
    }

    #[tokio::test]
    async fn test_resolver_does_not_double_qualify() {
        let geocoder = MockGeocoder::new();
        let resolver = LocationResolver::new(Arc::new(geocoder.clone()), "India");

        resolver.resolve("Delhi, india").await;
        assert_eq!(geocoder.queries(), vec!["Delhi, india".to_string()]);
    }

    #[tokio::test]
    async fn test_resolver_empty_results_is_none() {
        let geocoder = MockGeocoder::new();
        let resolver = LocationResolver::new(Arc::new(geocoder), "India");

        assert!(resolver.resolve("Atlantis").await.is_none());
    }

    #[tokio::test]
    async fn test_resolver_network_failure_is_none() {
        let geocoder = MockGeocoder::new()
            .with_place("Mumbai", 19.07, 72.87, "Mumbai")
            .failing(GeocodingError::Network("connection refused".to_string()));
        let resolver = LocationResolver::new(Arc::new(geocoder.clone()), "India");

        assert!(resolver.resolve("Mumbai").await.is_none());
        assert_eq!(geocoder.call_count(), 1);
    }
}
