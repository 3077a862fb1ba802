//! Headless map session
//!
//! [`MapSession`] is the single owner of everything the map shows: the
//! viewport and current view, the active tile layer and theme chrome, and
//! the displayed route state (start/end markers, two highlight circles and
//! one route control).
//!
//! At most one route state exists at a time. [`MapSession::render_route`]
//! removes every marker, circle and route control before adding the new
//! set, so repeated renders never accumulate overlays. Routing outcomes are
//! applied afterwards through [`MapSession::apply_routes_found`] or
//! [`MapSession::apply_routing_error`], addressed by the control they belong
//! to; an outcome for a control that has since been replaced is ignored.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

pub mod overlays;
pub mod tiles;
pub mod viewport;

use self::overlays::{Circle, Marker, Overlay, OverlayId, OverlayKind, RouteControl, RoutingOptions};
use self::tiles::{ThemeChrome, TileLayer};
use self::viewport::{fit_view, Bounds, MapView, Viewport};
use crate::config::MapConfig;
use crate::routing::RoutePath;
use crate::types::{LatLng, Place, Theme};

const MIN_ZOOM: u8 = 0;

/// Identifies the route control created by one render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteTicket {
    pub control_id: OverlayId,
    pub from: LatLng,
    pub to: LatLng,
}

pub struct MapSession {
    viewport: Viewport,
    view: MapView,
    fitted_bounds: Option<Bounds>,
    theme: Theme,
    tile_layer: TileLayer,
    chrome: ThemeChrome,
    overlays: Vec<Overlay>,
    next_id: OverlayId,
    fit_padding: u32,
    route_max_zoom: u8,
    circle_radius_m: f64,
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
pub struct MapSnapshot {
    pub theme: Theme,
    pub tile_layer: TileLayer,
    pub chrome: ThemeChrome,
    pub view: MapView,
    pub fitted_bounds: Option<Bounds>,
    pub center_tile: String,
    pub overlays: Vec<Overlay>,
}

impl MapSession {
    /// Map centered on the configured default view
    pub fn new(config: &MapConfig) -> Self {
        let theme = config.theme;
        Self {
            viewport: Viewport {
                width: config.viewport[0],
                height: config.viewport[1],
            },
            view: MapView {
                center: config.center(),
                zoom: config.zoom,
            },
            fitted_bounds: None,
            theme,
            tile_layer: TileLayer::for_theme(theme),
            chrome: ThemeChrome::for_theme(theme),
            overlays: Vec::new(),
            next_id: 1,
            fit_padding: config.fit_padding,
            route_max_zoom: config.route_max_zoom,
            circle_radius_m: config.circle_radius_m,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn tile_layer(&self) -> &TileLayer {
        &self.tile_layer
    }

    pub fn chrome(&self) -> &ThemeChrome {
        &self.chrome
    }

    pub fn view(&self) -> MapView {
        self.view
    }

    /// Bounds of the last fit, if the view was fitted since the last render
    pub fn fitted_bounds(&self) -> Option<Bounds> {
        self.fitted_bounds
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.overlays.iter().filter_map(|o| match o {
            Overlay::Marker(m) => Some(m),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = &Circle> {
        self.overlays.iter().filter_map(|o| match o {
            Overlay::Circle(c) => Some(c),
            _ => None,
        })
    }

    pub fn route_control(&self) -> Option<&RouteControl> {
        self.overlays.iter().find_map(|o| match o {
            Overlay::RouteControl(r) => Some(r),
            _ => None,
        })
    }

    pub fn count(&self, kind: OverlayKind) -> usize {
        self.overlays.iter().filter(|o| o.kind() == kind).count()
    }

    /// Swap to the other theme's tile layer and chrome
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.tile_layer = TileLayer::for_theme(self.theme);
        self.chrome = ThemeChrome::for_theme(self.theme);

        // Tile layers differ in maximum zoom
        self.view.zoom = self.view.zoom.min(self.tile_layer.max_zoom);
        info!("Map theme switched to {}", self.theme);
        self.theme
    }

    pub fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.view = MapView {
            center,
            zoom: zoom.min(self.tile_layer.max_zoom),
        };
        self.fitted_bounds = None;
    }

    /// Fit the view to `bounds` with the session padding
    ///
    /// `max_zoom` defaults to the tile layer's maximum.
    pub fn fit_bounds(&mut self, bounds: Bounds, max_zoom: Option<u8>) {
        let max_zoom = max_zoom
            .unwrap_or(self.tile_layer.max_zoom)
            .min(self.tile_layer.max_zoom);
        self.view = fit_view(&bounds, self.viewport, self.fit_padding, MIN_ZOOM, max_zoom);
        self.fitted_bounds = Some(bounds);
        debug!(
            zoom = self.view.zoom,
            lat = self.view.center.lat,
            lon = self.view.center.lon,
            "View fitted to bounds"
        );
    }

    /// Replace the displayed route state with markers, circles and a route
    /// control between `origin` and `destination`
    ///
    /// `from_label`/`to_label` are the texts the user typed; they appear in
    /// the marker popups.
    pub fn render_route(
        &mut self,
        origin: &Place,
        from_label: &str,
        destination: &Place,
        to_label: &str,
    ) -> RouteTicket {
        self.clear_route();

        let from = origin.position;
        let to = destination.position;

        let start = self.allocate_id();
        self.overlays.push(Overlay::Marker(Marker {
            id: start,
            position: from,
            popup: format!("Start: {}", from_label),
            popup_open: true,
        }));
        let end = self.allocate_id();
        self.overlays.push(Overlay::Marker(Marker {
            id: end,
            position: to,
            popup: format!("End: {}", to_label),
            popup_open: false,
        }));

        let radius = self.circle_radius_m;
        let id = self.allocate_id();
        self.overlays.push(Overlay::Circle(Circle::highlight(id, from, radius)));
        let id = self.allocate_id();
        self.overlays.push(Overlay::Circle(Circle::highlight(id, to, radius)));

        let control_id = self.allocate_id();
        self.overlays.push(Overlay::RouteControl(RouteControl {
            id: control_id,
            waypoints: [from, to],
            options: RoutingOptions::default(),
            route: None,
            failed: false,
        }));

        info!(control_id, "Route state drawn from {} to {}", from, to);
        RouteTicket { control_id, from, to }
    }

    /// Draw the found route and fit the view to it
    ///
    /// A path without geometry fits the endpoint markers instead. Returns
    /// `false` if the control is no longer on the map.
    pub fn apply_routes_found(&mut self, control_id: OverlayId, path: &RoutePath) -> bool {
        let Some(control) = self.route_control_mut(control_id) else {
            debug!(control_id, "Ignoring route for a removed control");
            return false;
        };
        control.route = Some(path.clone());
        control.failed = false;
        let waypoints = control.waypoints;

        if let Some(bounds) = Bounds::from_points(&path.points) {
            let max_zoom = self.route_max_zoom;
            self.fit_bounds(bounds, Some(max_zoom));
        } else if let Some(bounds) = Bounds::from_points(&waypoints) {
            debug!(control_id, "Route has no geometry, fitting endpoints");
            self.fit_bounds(bounds, None);
        }
        true
    }

    /// Fall back to showing just the two endpoint markers
    ///
    /// Returns `false` if the control is no longer on the map.
    pub fn apply_routing_error(&mut self, control_id: OverlayId) -> bool {
        let Some(control) = self.route_control_mut(control_id) else {
            debug!(control_id, "Ignoring routing error for a removed control");
            return false;
        };
        control.failed = true;
        let waypoints = control.waypoints;

        if let Some(bounds) = Bounds::from_points(&waypoints) {
            self.fit_bounds(bounds, None);
        }
        true
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            theme: self.theme,
            tile_layer: self.tile_layer.clone(),
            chrome: self.chrome.clone(),
            view: self.view,
            fitted_bounds: self.fitted_bounds,
            center_tile: self.tile_layer.tile_containing(self.view.center, self.view.zoom),
            overlays: self.overlays.clone(),
        }
    }

    /// Displayed overlays as a GeoJSON feature collection
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .overlays
            .iter()
            .map(|overlay| match overlay {
                Overlay::Marker(m) => json!({
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [m.position.lon, m.position.lat]},
                    "properties": {"kind": "marker", "popup": m.popup},
                }),
                Overlay::Circle(c) => json!({
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [c.center.lon, c.center.lat]},
                    "properties": {"kind": "circle", "radius_m": c.radius_m, "color": c.color},
                }),
                Overlay::RouteControl(r) => match &r.route {
                    Some(path) => json!({
                        "type": "Feature",
                        "geometry": {
                            "type": "LineString",
                            "coordinates": path.points.iter().map(|p| [p.lon, p.lat]).collect::<Vec<_>>(),
                        },
                        "properties": {
                            "kind": "route",
                            "distance_m": path.distance_m,
                            "duration_s": path.duration_s,
                            "color": r.options.line.color,
                        },
                    }),
                    None => json!({
                        "type": "Feature",
                        "geometry": {
                            "type": "MultiPoint",
                            "coordinates": r.waypoints.iter().map(|p| [p.lon, p.lat]).collect::<Vec<_>>(),
                        },
                        "properties": {"kind": "waypoints", "failed": r.failed},
                    }),
                },
            })
            .collect();

        json!({"type": "FeatureCollection", "features": features})
    }

    /// Remove the route control, markers and circles; the tile layer stays
    fn clear_route(&mut self) {
        let before = self.overlays.len();
        self.overlays.retain(|o| {
            !matches!(
                o.kind(),
                OverlayKind::RouteControl | OverlayKind::Marker | OverlayKind::Circle
            )
        });
        self.fitted_bounds = None;
        if before > 0 {
            debug!("Cleared {} overlays", before - self.overlays.len());
        }
    }

    fn route_control_mut(&mut self, control_id: OverlayId) -> Option<&mut RouteControl> {
        self.overlays.iter_mut().find_map(|o| match o {
            Overlay::RouteControl(r) if r.id == control_id => Some(r),
            _ => None,
        })
    }

    fn allocate_id(&mut self) -> OverlayId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
