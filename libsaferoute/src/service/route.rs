//! Route orchestration
//!
//! One "find route" action is an ordered pipeline: validate, resolve the
//! origin, resolve the destination, analyze, render. Each step can
//! short-circuit. Rendering starts the routing backend on a spawned task and
//! [`RouteService::find_route`] returns a [`PendingRoute`] before the routing
//! outcome is known; exactly one outcome is later delivered through that
//! handle and on the event bus.

use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::events::{Event, StatusTone};
use super::ui::{lock, UiContext};
use crate::error::{Result, RoutingError, SafeRouteError};
use crate::geocoding::LocationResolver;
use crate::map::overlays::OverlayId;
use crate::map::MapSession;
use crate::routing::{RoutePath, Router};
use crate::safety::{SafetyAnalyzer, SafetyVerdict};
use crate::types::{Place, RouteRequest};

pub const STATUS_SEARCHING: &str = "🔍 Searching for locations...";
pub const STATUS_ANALYZING: &str = "✨ AI Analyzing Route Safety...";
pub const STATUS_DRAWING: &str = "✅ Route Verified! Drawing map...";
pub const STATUS_DISPLAYED: &str = "✅ Safe Route Displayed";
pub const STATUS_ROUTE_FAILED: &str = "⚠️ Route calculation failed. Try closer locations.";

/// What the routing backend reported for one render
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEvent {
    RoutesFound(RoutePath),
    RoutingError(RoutingError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub request_id: String,
    pub control_id: OverlayId,
    pub event: RouteEvent,
    /// False when a later render replaced the control first, in which case
    /// neither the map nor the page was touched
    pub applied: bool,
}

/// Places and verdict of a rendered request
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRoute {
    pub request_id: String,
    pub origin: Place,
    pub destination: Place,
    pub verdict: SafetyVerdict,
    pub control_id: OverlayId,
}

/// A drawn route whose routing outcome is still outstanding
pub struct PendingRoute {
    pub route: RenderedRoute,
    handle: JoinHandle<RouteOutcome>,
}

impl PendingRoute {
    /// Wait for the routing outcome
    pub async fn wait(self) -> RouteOutcome {
        let request_id = self.route.request_id.clone();
        let control_id = self.route.control_id;
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Route task for {} ended abnormally: {}", request_id, e);
                RouteOutcome {
                    request_id,
                    control_id,
                    event: RouteEvent::RoutingError(RoutingError::Aborted),
                    applied: false,
                }
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[derive(Clone)]
pub struct RouteService {
    resolver: LocationResolver,
    router: Arc<dyn Router>,
    safety: Arc<dyn SafetyAnalyzer>,
    map: Arc<Mutex<MapSession>>,
    ui: UiContext,
}

impl RouteService {
    pub fn new(
        resolver: LocationResolver,
        router: Arc<dyn Router>,
        safety: Arc<dyn SafetyAnalyzer>,
        map: Arc<Mutex<MapSession>>,
        ui: UiContext,
    ) -> Self {
        Self {
            resolver,
            router,
            safety,
            map,
            ui,
        }
    }

    /// Run the find-route pipeline for `request`
    ///
    /// # Errors
    ///
    /// - [`SafeRouteError::InvalidInput`] if either field is blank; nothing
    ///   else happens
    /// - [`SafeRouteError::LocationNotFound`] if a place cannot be resolved;
    ///   the find button is ready again
    ///
    /// Routing failures are not errors here: they arrive later through the
    /// returned [`PendingRoute`].
    pub async fn find_route(&self, request: &RouteRequest) -> Result<PendingRoute> {
        if let Err(e) = request.validate() {
            if let SafeRouteError::InvalidInput(message) = &e {
                self.ui.alert(message.clone());
            }
            return Err(e);
        }

        let from = request.from.trim();
        let to = request.to.trim();
        info!(request_id = %request.id, "Finding route from {:?} to {:?}", from, to);

        self.ui.update(|page| page.disable_find());
        self.ui.status(STATUS_SEARCHING, StatusTone::Info);

        let origin = match self.resolve_step(&request.id, from).await {
            Some(place) => place,
            None => return Err(self.not_found(from)),
        };
        let destination = match self.resolve_step(&request.id, to).await {
            Some(place) => place,
            None => return Err(self.not_found(to)),
        };

        self.ui.status(STATUS_ANALYZING, StatusTone::Info);
        let verdict = self.safety.analyze().await;
        self.ui.events().emit(Event::RouteAnalyzed {
            request_id: request.id.clone(),
            safe: verdict.safe,
            message: verdict.message.clone(),
        });

        self.ui.status(STATUS_DRAWING, StatusTone::Success);
        let ticket = lock(&self.map).render_route(&origin, from, &destination, to);

        let route = RenderedRoute {
            request_id: request.id.clone(),
            origin,
            destination,
            verdict,
            control_id: ticket.control_id,
        };

        self.ui.update(|page| page.enable_find());

        let handle = tokio::spawn(deliver_outcome(
            Arc::clone(&self.router),
            Arc::clone(&self.map),
            self.ui.clone(),
            route.clone(),
        ));

        Ok(PendingRoute { route, handle })
    }

    async fn resolve_step(&self, request_id: &str, query: &str) -> Option<Place> {
        self.ui.status(format!("📍 Looking for \"{}\"...", query), StatusTone::Info);
        let place = self.resolver.resolve(query).await;
        self.ui.events().emit(Event::LocationResolved {
            request_id: request_id.to_string(),
            query: query.to_string(),
            place: place.clone(),
        });
        place
    }

    fn not_found(&self, query: &str) -> SafeRouteError {
        self.ui.status(format!("❌ Could not find \"{}\"", query), StatusTone::Error);
        self.ui.alert(format!("Could not find location: {}", query));
        self.ui.update(|page| page.enable_find());
        SafeRouteError::LocationNotFound(query.to_string())
    }
}

/// Run the router and apply its outcome to the map and page
async fn deliver_outcome(
    router: Arc<dyn Router>,
    map: Arc<Mutex<MapSession>>,
    ui: UiContext,
    route: RenderedRoute,
) -> RouteOutcome {
    let result = router
        .route(route.origin.position, route.destination.position)
        .await;

    let control_id = route.control_id;
    match result {
        Ok(path) => {
            let applied = lock(&map).apply_routes_found(control_id, &path);
            if applied {
                ui.status(STATUS_DISPLAYED, StatusTone::Success);
                ui.update(|page| {
                    page.share_controls_visible = true;
                    page.show_safety_panel(&route.verdict);
                });
            }
            ui.events().emit(Event::RoutesFound {
                request_id: route.request_id.clone(),
                control_id,
                distance_m: path.distance_m,
                duration_s: path.duration_s,
                applied,
            });
            RouteOutcome {
                request_id: route.request_id,
                control_id,
                event: RouteEvent::RoutesFound(path),
                applied,
            }
        }
        Err(error) => {
            warn!("Routing via {} failed: {}", router.name(), error);
            let applied = lock(&map).apply_routing_error(control_id);
            if applied {
                ui.status(STATUS_ROUTE_FAILED, StatusTone::Warning);
            }
            ui.events().emit(Event::RoutingFailed {
                request_id: route.request_id.clone(),
                control_id,
                error: error.to_string(),
                applied,
            });
            RouteOutcome {
                request_id: route.request_id,
                control_id,
                event: RouteEvent::RoutingError(error),
                applied,
            }
        }
    }
}
