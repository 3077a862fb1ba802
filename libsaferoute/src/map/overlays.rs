//! Map overlays: markers, highlight circles and the route control

use serde::{Deserialize, Serialize};

use crate::routing::RoutePath;
use crate::types::LatLng;

pub type OverlayId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Marker,
    Circle,
    RouteControl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    Marker(Marker),
    Circle(Circle),
    RouteControl(RouteControl),
}

impl Overlay {
    pub fn id(&self) -> OverlayId {
        match self {
            Overlay::Marker(m) => m.id,
            Overlay::Circle(c) => c.id,
            Overlay::RouteControl(r) => r.id,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        match self {
            Overlay::Marker(_) => OverlayKind::Marker,
            Overlay::Circle(_) => OverlayKind::Circle,
            Overlay::RouteControl(_) => OverlayKind::RouteControl,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: OverlayId,
    pub position: LatLng,
    pub popup: String,
    pub popup_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub id: OverlayId,
    pub center: LatLng,
    pub radius_m: f64,
    pub color: String,
    pub fill_opacity: f64,
    pub class_name: String,
}

impl Circle {
    /// Pulsing green endpoint highlight
    pub fn highlight(id: OverlayId, center: LatLng, radius_m: f64) -> Self {
        Self {
            id,
            center,
            radius_m,
            color: "#00FF00".to_string(),
            fill_opacity: 0.3,
            class_name: "pulsing-circle".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub opacity: f64,
    pub weight: u32,
    pub class_name: String,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "#00FF00".to_string(),
            opacity: 1.0,
            weight: 8,
            class_name: "neon-route-line".to_string(),
        }
    }
}

/// How the route control behaves
///
/// Markers are drawn by the session itself and the view is fitted
/// explicitly, so the control neither creates markers nor fits routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingOptions {
    pub route_while_dragging: bool,
    pub add_waypoints: bool,
    pub draggable_waypoints: bool,
    pub fit_selected_routes: bool,
    pub create_markers: bool,
    pub line: LineStyle,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            route_while_dragging: false,
            add_waypoints: false,
            draggable_waypoints: false,
            fit_selected_routes: false,
            create_markers: false,
            line: LineStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteControl {
    pub id: OverlayId,
    /// Exactly origin and destination; no intermediate stops
    pub waypoints: [LatLng; 2],
    pub options: RoutingOptions,
    /// Set once the routing backend found a route
    pub route: Option<RoutePath>,
    /// Set when the routing backend failed
    pub failed: bool,
}
