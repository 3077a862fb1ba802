//! OSRM HTTP routing backend

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{RoutePath, Router};
use crate::config::RoutingConfig;
use crate::error::{ConfigError, Result, RoutingError};
use crate::rate_limiter::RateLimiter;
use crate::types::LatLng;

const SERVICE: &str = "osrm";

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

/// GeoJSON line string; positions are `[lon, lat]`
#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

pub struct OsrmRouter {
    client: reqwest::Client,
    service_url: String,
    profile: String,
    limiter: RateLimiter,
}

impl OsrmRouter {
    pub fn new(config: &RoutingConfig) -> Result<Self> {
        Url::parse(&config.service_url).map_err(|e| ConfigError::InvalidValue {
            field: "routing.service_url".to_string(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RoutingError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            service_url: config.service_url.trim_end_matches('/').to_string(),
            profile: config.profile.clone(),
            limiter: RateLimiter::new(SERVICE, Duration::from_millis(config.min_interval_ms)),
        })
    }

    /// Route request URL; OSRM takes coordinates as `lon,lat`
    pub fn route_url(&self, from: LatLng, to: LatLng) -> std::result::Result<Url, RoutingError> {
        let raw = format!(
            "{}/{}/{},{};{},{}",
            self.service_url, self.profile, from.lon, from.lat, to.lon, to.lat
        );
        let mut url = Url::parse(&raw).map_err(|e| RoutingError::InvalidResponse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson")
            .append_pair("alternatives", "false")
            .append_pair("steps", "false");
        Ok(url)
    }
}

#[async_trait]
impl Router for OsrmRouter {
    async fn route(&self, from: LatLng, to: LatLng) -> std::result::Result<RoutePath, RoutingError> {
        let url = self.route_url(from, to)?;
        self.limiter.acquire().await;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RoutingError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RoutingError::Network(e.to_string()))?;

        // OSRM reports NoRoute and friends with a JSON body on 4xx statuses
        match parse_route(&body) {
            Err(RoutingError::InvalidResponse(_)) if !status.is_success() => {
                Err(RoutingError::Status(status.as_u16()))
            }
            result => {
                if let Ok(path) = &result {
                    info!("Route found: {} ({} points)", path.summary(), path.points.len());
                }
                result
            }
        }
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

/// Parse an OSRM route response into the first route
pub(crate) fn parse_route(body: &str) -> std::result::Result<RoutePath, RoutingError> {
    let response: OsrmResponse =
        serde_json::from_str(body).map_err(|e| RoutingError::InvalidResponse(e.to_string()))?;

    if response.code != "Ok" {
        return Err(RoutingError::NoRoute(
            response.message.unwrap_or(response.code),
        ));
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RoutingError::NoRoute("service returned no routes".to_string()))?;

    if route.geometry.coordinates.is_empty() {
        return Err(RoutingError::InvalidResponse("route has no geometry".to_string()));
    }

    Ok(RoutePath {
        points: route
            .geometry
            .coordinates
            .iter()
            .map(|[lon, lat]| LatLng::new(*lat, *lon))
            .collect(),
        distance_m: route.distance,
        duration_s: route.duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubServer;

    #[test]
    fn test_parse_route_ok() {
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 148230.5,
                "duration": 10260.1,
                "geometry": {"type": "LineString", "coordinates": [[72.8777, 19.076], [73.2, 18.8], [73.8567, 18.5204]]}
            }],
            "waypoints": []
        }"#;

        let path = parse_route(body).unwrap();
        assert_eq!(path.points.len(), 3);
        assert_eq!(path.points[0], LatLng::new(19.076, 72.8777));
        assert_eq!(path.points[2], LatLng::new(18.5204, 73.8567));
        assert_eq!(path.distance_m, 148230.5);
    }

    #[test]
    fn test_parse_route_no_route() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        assert_eq!(
            parse_route(body).unwrap_err(),
            RoutingError::NoRoute("Impossible route between points".to_string())
        );

        let body = r#"{"code": "NoSegment"}"#;
        assert_eq!(
            parse_route(body).unwrap_err(),
            RoutingError::NoRoute("NoSegment".to_string())
        );
    }

    #[test]
    fn test_parse_route_without_routes() {
        let body = r#"{"code": "Ok", "routes": []}"#;
        assert!(matches!(parse_route(body), Err(RoutingError::NoRoute(_))));
    }

    #[test]
    fn test_parse_route_garbage() {
        assert!(matches!(
            parse_route("<html>502 Bad Gateway</html>"),
            Err(RoutingError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_route_url_uses_lon_lat_order() {
        let router = OsrmRouter::new(&RoutingConfig::default()).unwrap();
        let url = router
            .route_url(LatLng::new(19.076, 72.8777), LatLng::new(18.5204, 73.8567))
            .unwrap();

        assert_eq!(
            url.path(),
            "/route/v1/driving/72.8777,19.076;73.8567,18.5204"
        );
        assert!(url.query().unwrap().contains("geometries=geojson"));
        assert!(url.query().unwrap().contains("overview=full"));
    }

    fn router_for(server: &StubServer, min_interval_ms: u64) -> OsrmRouter {
        OsrmRouter::new(&RoutingConfig {
            service_url: format!("{}/route/v1", server.base_url),
            min_interval_ms,
            ..RoutingConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_error_status_with_html_body() {
        let server = StubServer::start("404 Not Found", "text/html", "<html>Not Found</html>").await;
        let router = router_for(&server, 0);

        let result = router
            .route(LatLng::new(19.076, 72.8777), LatLng::new(18.5204, 73.8567))
            .await;
        assert_eq!(result, Err(RoutingError::Status(404)));
    }

    #[tokio::test]
    async fn test_error_status_with_osrm_body() {
        let body = r#"{"code":"NoRoute","message":"Impossible route between points"}"#;
        let server = StubServer::start("400 Bad Request", "application/json", body).await;
        let router = router_for(&server, 0);

        let result = router
            .route(LatLng::new(19.076, 72.8777), LatLng::new(-33.86, 151.21))
            .await;
        assert_eq!(
            result,
            Err(RoutingError::NoRoute("Impossible route between points".to_string()))
        );
    }

    #[tokio::test]
    async fn test_requests_are_spaced() {
        let body = r#"{"code":"Ok","routes":[{"distance":10.0,"duration":2.0,"geometry":{"coordinates":[[72.8777,19.076],[72.8778,19.0761]]}}]}"#;
        let server = StubServer::start("200 OK", "application/json", body).await;
        let router = router_for(&server, 200);
        let (from, to) = (LatLng::new(19.076, 72.8777), LatLng::new(19.0761, 72.8778));

        let start = std::time::Instant::now();
        router.route(from, to).await.unwrap();
        let path = router.route(from, to).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(server.requests(), 2);
        assert_eq!(path.points.len(), 2);
    }
}
