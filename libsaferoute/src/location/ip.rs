//! Approximate positioning through an IP geolocation service

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::PositionSource;
use crate::error::{ConfigError, PositionError, Result};
use crate::types::DeviceFix;

/// Rough accuracy of city-level IP geolocation
const IP_ACCURACY_M: f64 = 5_000.0;

#[derive(Debug, Deserialize)]
struct IpLookup {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Queries an ipapi.co-compatible endpoint (`latitude`/`longitude` fields)
pub struct IpPositionSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl IpPositionSource {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| ConfigError::InvalidValue {
            field: "location.ip_endpoint".to_string(),
            reason: e.to_string(),
        })?;

        // The locator enforces the caller's deadline; this only stops a
        // dangling connection from outliving it.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("saferoute/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "location.ip_endpoint".to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl PositionSource for IpPositionSource {
    async fn current_position(&self, _high_accuracy: bool) -> std::result::Result<DeviceFix, PositionError> {
        debug!("GET {}", self.endpoint);

        let response = self.client.get(self.endpoint.clone()).send().await.map_err(|e| {
            warn!("IP geolocation request failed: {}", e);
            PositionError::PositionUnavailable
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(PositionError::PermissionDenied);
        }
        if !status.is_success() {
            warn!("IP geolocation responded with HTTP {}", status.as_u16());
            return Err(PositionError::PositionUnavailable);
        }

        let body = response.text().await.map_err(|e| {
            warn!("IP geolocation body unreadable: {}", e);
            PositionError::PositionUnavailable
        })?;

        parse_lookup(&body)
    }

    fn name(&self) -> &str {
        "ip"
    }
}

pub(crate) fn parse_lookup(body: &str) -> std::result::Result<DeviceFix, PositionError> {
    let lookup: IpLookup = serde_json::from_str(body).map_err(|e| {
        warn!("Invalid IP geolocation response: {}", e);
        PositionError::PositionUnavailable
    })?;

    if lookup.error {
        warn!(
            "IP geolocation refused: {}",
            lookup.reason.as_deref().unwrap_or("no reason given")
        );
        return Err(PositionError::PositionUnavailable);
    }

    match (lookup.latitude, lookup.longitude) {
        (Some(lat), Some(lon)) => {
            let mut fix = DeviceFix::new(lat, lon, "ip");
            fix.accuracy_m = Some(IP_ACCURACY_M);
            Ok(fix)
        }
        _ => Err(PositionError::PositionUnavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubServer;
    use crate::types::LatLng;

    #[test]
    fn test_parse_lookup() {
        let body = r#"{"ip":"203.0.113.7","city":"Mumbai","latitude":19.0728,"longitude":72.8826}"#;
        let fix = parse_lookup(body).unwrap();
        assert_eq!(fix.position.lat, 19.0728);
        assert_eq!(fix.position.lon, 72.8826);
        assert_eq!(fix.accuracy_m, Some(5_000.0));
        assert_eq!(fix.source, "ip");
    }

    #[test]
    fn test_parse_lookup_error_payload() {
        let body = r#"{"error":true,"reason":"RateLimited"}"#;
        assert_eq!(parse_lookup(body), Err(PositionError::PositionUnavailable));
    }

    #[test]
    fn test_parse_lookup_missing_coordinates() {
        assert_eq!(
            parse_lookup(r#"{"ip":"127.0.0.1","reserved":true}"#),
            Err(PositionError::PositionUnavailable)
        );
        assert_eq!(parse_lookup("<html>"), Err(PositionError::PositionUnavailable));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(IpPositionSource::new("not a url").is_err());
        assert!(IpPositionSource::new("https://ipapi.co/json/").is_ok());
    }

    #[tokio::test]
    async fn test_forbidden_status_is_permission_denied() {
        let server = StubServer::start("403 Forbidden", "text/plain", "blocked").await;
        let source = IpPositionSource::new(&format!("{}/json/", server.base_url)).unwrap();

        assert_eq!(
            source.current_position(false).await,
            Err(PositionError::PermissionDenied)
        );
        assert_eq!(server.requests(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_position_unavailable() {
        let server = StubServer::start("500 Internal Server Error", "text/plain", "oops").await;
        let source = IpPositionSource::new(&format!("{}/json/", server.base_url)).unwrap();

        assert_eq!(
            source.current_position(true).await,
            Err(PositionError::PositionUnavailable)
        );
    }

    #[tokio::test]
    async fn test_lookup_over_http() {
        let body = r#"{"city":"Pune","latitude":18.5204,"longitude":73.8567}"#;
        let server = StubServer::start("200 OK", "application/json", body).await;
        let source = IpPositionSource::new(&format!("{}/json/", server.base_url)).unwrap();

        let fix = source.current_position(false).await.unwrap();
        assert_eq!(fix.position, LatLng::new(18.5204, 73.8567));
        assert_eq!(fix.source, "ip");
    }
}
