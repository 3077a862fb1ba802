//! Web Mercator projection and fit-to-bounds arithmetic

use serde::{Deserialize, Serialize};

use crate::types::LatLng;

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Axis-aligned geographic rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// Smallest bounds containing every point, or `None` for no points
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds {
            south_west: *first,
            north_east: *first,
        };
        for p in &points[1..] {
            bounds.south_west.lat = bounds.south_west.lat.min(p.lat);
            bounds.south_west.lon = bounds.south_west.lon.min(p.lon);
            bounds.north_east.lat = bounds.north_east.lat.max(p.lat);
            bounds.north_east.lon = bounds.north_east.lon.max(p.lon);
        }
        Some(bounds)
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lon >= self.south_west.lon
            && p.lon <= self.north_east.lon
    }
}

/// Map viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// What the map is looking at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

/// Project to global pixel coordinates at `zoom`
pub fn project(p: LatLng, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = scale * (p.lon + 180.0) / 360.0;
    let y = scale * (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0;
    (x, y)
}

/// Inverse of [`project`]
pub fn unproject(x: f64, y: f64, zoom: f64) -> LatLng {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lon = x / scale * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / scale);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lon)
}

/// Largest integer zoom at which `bounds` plus `padding` on every side fits
/// the viewport, clamped to `[min_zoom, max_zoom]`
pub fn bounds_zoom(bounds: &Bounds, viewport: Viewport, padding: u32, min_zoom: u8, max_zoom: u8) -> u8 {
    let avail_w = (viewport.width as f64 - 2.0 * padding as f64).max(1.0);
    let avail_h = (viewport.height as f64 - 2.0 * padding as f64).max(1.0);

    let (x0, y0) = project(
        LatLng::new(bounds.north_east.lat, bounds.south_west.lon),
        0.0,
    );
    let (x1, y1) = project(
        LatLng::new(bounds.south_west.lat, bounds.north_east.lon),
        0.0,
    );
    let span_w = (x1 - x0).abs();
    let span_h = (y1 - y0).abs();

    // A degenerate span never limits the zoom
    let scale_w = if span_w > 0.0 { avail_w / span_w } else { f64::INFINITY };
    let scale_h = if span_h > 0.0 { avail_h / span_h } else { f64::INFINITY };
    let scale = scale_w.min(scale_h);

    if !scale.is_finite() {
        return max_zoom;
    }

    let zoom = scale.log2().floor();
    zoom.clamp(min_zoom as f64, max_zoom as f64) as u8
}

/// Center and zoom showing `bounds`
pub fn fit_view(bounds: &Bounds, viewport: Viewport, padding: u32, min_zoom: u8, max_zoom: u8) -> MapView {
    let zoom = bounds_zoom(bounds, viewport, padding, min_zoom, max_zoom);
    let (x0, y0) = project(bounds.south_west, zoom as f64);
    let (x1, y1) = project(bounds.north_east, zoom as f64);
    MapView {
        center: unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0, zoom as f64),
        zoom,
    }
}
