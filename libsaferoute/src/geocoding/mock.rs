//! Mock geocoder for testing
//!
//! Available in all builds so integration tests can exercise the route
//! workflow without network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use super::{GeocodeMatch, Geocoder};
use crate::error::GeocodingError;

/// Geocoder answering from a fixed table
///
/// A query matches every entry whose key occurs in it (case-insensitive),
/// in insertion order. Clones share the recorded query log.
#[derive(Debug, Clone, Default)]
pub struct MockGeocoder {
    entries: Vec<(String, GeocodeMatch)>,
    failure: Option<GeocodingError>,
    delay: Duration,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a match returned for queries containing `key`
    pub fn with_place(mut self, key: &str, lat: f64, lon: f64, display_name: &str) -> Self {
        self.entries.push((
            key.to_lowercase(),
            GeocodeMatch {
                lat,
                lon,
                display_name: display_name.to_string(),
            },
        ));
        self
    }

    /// Fail every search with `error`
    pub fn failing(mut self, error: GeocodingError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Simulate network latency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every query received so far, as sent to the service
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeMatch>, GeocodingError> {
        self.queries.lock().unwrap().push(query.to_string());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let needle = query.to_lowercase();
        Ok(self
            .entries
            .iter()
            .filter(|(key, _)| needle.contains(key.as_str()))
            .map(|(_, m)| m.clone())
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
