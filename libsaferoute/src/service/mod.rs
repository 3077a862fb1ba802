//! Service layer for SafeRoute
//!
//! `SafeRouteService` is the application context: constructed once, it owns
//! the map session, the page state and the event bus, and hands them to the
//! specialized sub-services:
//!
//! - `RouteService`: the find-route pipeline
//! - `ShareService`: live-location sharing and SOS broadcasts
//! - `EventBus`: progress event distribution
//!
//! # Example
//!
//! ```no_run
//! use libsaferoute::service::SafeRouteService;
//! use libsaferoute::types::RouteRequest;
//!
//! # async fn example() -> libsaferoute::Result<()> {
//! let service = SafeRouteService::new()?;
//!
//! let pending = service.route().find_route(&RouteRequest::new("Mumbai", "Pune")).await?;
//! let outcome = pending.wait().await;
//! println!("applied: {}", outcome.applied);
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod route;
pub mod share;
pub mod ui;

use std::sync::{Arc, Mutex};
use tracing::debug;

use self::events::{Event, EventBus, EventReceiver};
use self::route::RouteService;
use self::share::ShareService;
use self::ui::{lock, PageState, UiContext};
use crate::broadcast::{LinkOpener, SystemOpener};
use crate::geocoding::nominatim::NominatimGeocoder;
use crate::geocoding::{Geocoder, LocationResolver};
use crate::location::Locator;
use crate::map::{MapSession, MapSnapshot};
use crate::routing::osrm::OsrmRouter;
use crate::routing::Router;
use crate::safety::{PlaceholderSafetyAnalyzer, SafetyAnalyzer};
use crate::types::Theme;
use crate::{Config, Result};

/// The external capabilities a service runs against
///
/// [`Backends::from_config`] wires the real HTTP clients and the system link
/// opener; fields are public so callers can swap any of them (dry runs, a
/// fixed position, mocks in tests).
#[derive(Clone)]
pub struct Backends {
    pub geocoder: Arc<dyn Geocoder>,
    pub router: Arc<dyn Router>,
    pub safety: Arc<dyn SafetyAnalyzer>,
    pub locator: Locator,
    pub opener: Arc<dyn LinkOpener>,
}

impl Backends {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            geocoder: Arc::new(NominatimGeocoder::new(&config.geocoding)?),
            router: Arc::new(OsrmRouter::new(&config.routing)?),
            safety: Arc::new(PlaceholderSafetyAnalyzer::new(config.safety.delay())),
            locator: Locator::from_config(&config.location)?,
            opener: Arc::new(SystemOpener),
        })
    }
}

pub struct SafeRouteService {
    config: Arc<Config>,
    map: Arc<Mutex<MapSession>>,
    ui: UiContext,
    route: RouteService,
    share: ShareService,
}

impl SafeRouteService {
    /// Create a service from the configuration file (or the defaults when
    /// there is none)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is malformed or names an
    /// invalid endpoint.
    pub fn new() -> Result<Self> {
        let config = Config::load_or_default()?;
        Self::from_config(config)
    }

    /// Create a service with the real backends for `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let backends = Backends::from_config(&config)?;
        Ok(Self::with_backends(config, backends))
    }

    /// Create a service running against the given backends
    pub fn with_backends(config: Config, backends: Backends) -> Self {
        let config = Arc::new(config);
        let event_bus = EventBus::new(100);
        let ui = UiContext::new(event_bus);
        let map = Arc::new(Mutex::new(MapSession::new(&config.map)));

        debug!(
            geocoder = backends.geocoder.name(),
            router = backends.router.name(),
            opener = backends.opener.name(),
            "Service backends ready"
        );

        let resolver = LocationResolver::new(backends.geocoder, &config.geocoding.country);
        let route = RouteService::new(
            resolver,
            backends.router,
            backends.safety,
            Arc::clone(&map),
            ui.clone(),
        );
        let share = ShareService::new(
            backends.locator,
            backends.opener,
            Arc::new(config.share.clone()),
            ui.clone(),
        );

        Self {
            config,
            map,
            ui,
            route,
            share,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the route service
    pub fn route(&self) -> &RouteService {
        &self.route
    }

    /// Access the share service
    pub fn share(&self) -> &ShareService {
        &self.share
    }

    /// Copy of the current page state
    pub fn page(&self) -> PageState {
        self.ui.snapshot()
    }

    pub fn map_snapshot(&self) -> MapSnapshot {
        lock(&self.map).snapshot()
    }

    /// Run `f` against the map session
    ///
    /// The session stays locked while `f` runs; do not block in it.
    pub fn with_map<R>(&self, f: impl FnOnce(&MapSession) -> R) -> R {
        f(&lock(&self.map))
    }

    /// Switch between the dark and light map themes
    pub fn toggle_theme(&self) -> Theme {
        let theme = lock(&self.map).toggle_theme();
        self.ui.events().emit(Event::ThemeChanged { theme });
        theme
    }

    /// Subscribe to service events
    pub fn subscribe(&self) -> EventReceiver {
        self.ui.events().subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::RecordingOpener;
    use crate::geocoding::mock::MockGeocoder;
    use crate::location::mock::MockPositionSource;
    use crate::routing::mock::MockRouter;
    use crate::types::RouteRequest;
    use std::time::Duration;

    fn backends() -> Backends {
        Backends {
            geocoder: Arc::new(
                MockGeocoder::new()
                    .with_place("mumbai", 19.076, 72.8777, "Mumbai, Maharashtra, India")
                    .with_place("pune", 18.5204, 73.8567, "Pune, Maharashtra, India"),
            ),
            router: Arc::new(MockRouter::success()),
            safety: Arc::new(PlaceholderSafetyAnalyzer::new(Duration::ZERO)),
            locator: Locator::new(Arc::new(MockPositionSource::fix(19.076, 72.8777))),
            opener: Arc::new(RecordingOpener::new()),
        }
    }

    #[test]
    fn test_from_default_config() {
        let service = SafeRouteService::from_config(Config::default()).unwrap();
        assert_eq!(service.config().geocoding.country, "India");
        assert!(service.page().find_button.enabled);
        assert_eq!(service.map_snapshot().view.zoom, 5);
    }

    #[tokio::test]
    async fn test_route_then_share_shares_typed_route() {
        let service = SafeRouteService::with_backends(Config::default(), backends());

        service
            .route()
            .find_route(&RouteRequest::new("Mumbai", "Pune"))
            .await
            .unwrap()
            .wait()
            .await;
        assert!(service.page().share_controls_visible);

        let handle = service.share().share("Mumbai", "Pune").await;
        assert!(handle.message().contains("from *Mumbai* to *Pune*"));
    }

    #[tokio::test]
    async fn test_toggle_theme_emits_event() {
        let service = SafeRouteService::with_backends(Config::default(), backends());
        let mut events = service.subscribe();

        assert_eq!(service.toggle_theme(), Theme::Light);
        assert_eq!(
            events.recv().await.unwrap(),
            Event::ThemeChanged { theme: Theme::Light }
        );
        assert_eq!(service.with_map(|map| map.chrome().container_background.clone()), "#ddd");
    }
}
