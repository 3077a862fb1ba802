//! OpenStreetMap Nominatim geocoder

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{GeocodeMatch, Geocoder};
use crate::config::GeocodingConfig;
use crate::error::{ConfigError, GeocodingError, Result};
use crate::rate_limiter::RateLimiter;

const SERVICE: &str = "nominatim";

/// A single entry of a Nominatim `format=json` search response
///
/// Coordinates are transmitted as strings.
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: Url,
    limiter: RateLimiter,
}

impl NominatimGeocoder {
    /// Create a geocoder for the configured search endpoint
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint is not a valid URL or
    /// the HTTP client cannot be built.
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| ConfigError::InvalidValue {
            field: "geocoding.endpoint".to_string(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeocodingError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            limiter: RateLimiter::new(SERVICE, Duration::from_millis(config.min_interval_ms)),
        })
    }

    /// Full search URL for a query
    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query);
        url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> std::result::Result<Vec<GeocodeMatch>, GeocodingError> {
        let url = self.search_url(query);
        self.limiter.acquire().await;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodingError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodingError::Network(e.to_string()))?;

        parse_matches(&body)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

/// Parse a Nominatim JSON body, skipping entries with unparseable coordinates
pub(crate) fn parse_matches(body: &str) -> std::result::Result<Vec<GeocodeMatch>, GeocodingError> {
    let results: Vec<NominatimResult> =
        serde_json::from_str(body).map_err(|e| GeocodingError::InvalidResponse(e.to_string()))?;

    Ok(results
        .into_iter()
        .filter_map(|r| match (r.lat.parse::<f64>(), r.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Some(GeocodeMatch {
                lat,
                lon,
                display_name: r.display_name,
            }),
            _ => {
                debug!(raw_lat = %r.lat, raw_lon = %r.lon, "Skipping match with bad coordinates");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matches() {
        let body = r#"[
            {"place_id": 1, "lat": "19.0760", "lon": "72.8777", "display_name": "Mumbai, Maharashtra, India"},
            {"place_id": 2, "lat": "18.9", "lon": "72.8", "display_name": "Mumbai Suburban"}
        ]"#;

        let matches = parse_matches(body).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].lat, 19.076);
        assert_eq!(matches[0].lon, 72.8777);
        assert_eq!(matches[0].display_name, "Mumbai, Maharashtra, India");
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_matches("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_skips_bad_coordinates() {
        let body = r#"[
            {"lat": "north", "lon": "72.8", "display_name": "Broken"},
            {"lat": "18.52", "lon": "73.85", "display_name": "Pune"}
        ]"#;

        let matches = parse_matches(body).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].display_name, "Pune");
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_matches(r#"{"error": "Bad request"}"#).unwrap_err();
        assert!(matches!(err, GeocodingError::InvalidResponse(_)));
    }

    #[test]
    fn test_search_url_encodes_query() {
        let geocoder = NominatimGeocoder::new(&GeocodingConfig::default()).unwrap();
        let url = geocoder.search_url("Andheri East, Mumbai & more, India");

        assert_eq!(url.host_str(), Some("nominatim.openstreetmap.org"));
        assert_eq!(url.path(), "/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("format".to_string(), "json".to_string()),
                ("q".to_string(), "Andheri East, Mumbai & more, India".to_string()),
            ]
        );
        assert!(!url.as_str().contains("& more"));
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let config = GeocodingConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(NominatimGeocoder::new(&config).is_err());
    }
}
