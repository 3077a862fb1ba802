//! Base map tile layers and theme chrome

use serde::{Deserialize, Serialize};

use super::viewport::project;
use crate::types::{LatLng, Theme};

/// Raster tile source described by a URL template
///
/// The template understands `{s}` (subdomain), `{z}`, `{x}`, `{y}` and `{r}`
/// (retina suffix).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub subdomains: Vec<String>,
    pub max_zoom: u8,
}

impl TileLayer {
    /// CARTO "dark matter" tiles
    pub fn dark() -> Self {
        Self {
            url_template: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png".to_string(),
            attribution: "© OpenStreetMap contributors © CARTO".to_string(),
            subdomains: ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect(),
            max_zoom: 20,
        }
    }

    /// OpenStreetMap standard tiles
    pub fn light() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
            subdomains: ["a", "b", "c"].iter().map(|s| s.to_string()).collect(),
            max_zoom: 18,
        }
    }

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    /// Concrete URL of one tile
    pub fn tile_url(&self, z: u8, x: u32, y: u32, retina: bool) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let index = (x as usize + y as usize) % self.subdomains.len();
            self.subdomains[index].as_str()
        };

        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
            .replace("{r}", if retina { "@2x" } else { "" })
    }

    /// URL of the tile containing `position` at `zoom`
    pub fn tile_containing(&self, position: LatLng, zoom: u8) -> String {
        let zoom = zoom.min(self.max_zoom);
        let (px, py) = project(position, zoom as f64);
        let max_index = (1u32 << zoom) - 1;
        let x = ((px / 256.0).floor().max(0.0) as u32).min(max_index);
        let y = ((py / 256.0).floor().max(0.0) as u32).min(max_index);
        self.tile_url(zoom, x, y, false)
    }
}

/// Theme-dependent styling of the toggle button and map container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeChrome {
    /// The button offers switching to the other theme
    pub button_label: String,
    pub button_background: String,
    pub button_color: String,
    pub container_background: String,
}

impl ThemeChrome {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                button_label: "☀️ Light Mode".to_string(),
                button_background: "var(--santa-red)".to_string(),
                button_color: "white".to_string(),
                container_background: "#242424".to_string(),
            },
            Theme::Light => Self {
                button_label: "🌙 Dark Mode".to_string(),
                button_background: "var(--pine-green)".to_string(),
                button_color: "white".to_string(),
                container_background: "#ddd".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_url_expansion() {
        let dark = TileLayer::dark();
        assert_eq!(
            dark.tile_url(5, 22, 14, false),
            "https://a.basemaps.cartocdn.com/dark_all/5/22/14.png"
        );
        assert_eq!(
            dark.tile_url(5, 22, 15, true),
            "https://b.basemaps.cartocdn.com/dark_all/5/22/15@2x.png"
        );

        let light = TileLayer::light();
        assert_eq!(
            light.tile_url(3, 1, 1, true),
            "https://c.tile.openstreetmap.org/3/1/1.png"
        );
    }

    #[test]
    fn test_tile_containing_default_center() {
        // India's center at zoom 5 lies in tile x=23, y=14
        let url = TileLayer::light().tile_containing(LatLng::new(20.5937, 78.9629), 5);
        assert_eq!(url, "https://b.tile.openstreetmap.org/5/23/14.png");
    }

    #[test]
    fn test_tile_containing_clamps_zoom() {
        let url = TileLayer::light().tile_containing(LatLng::new(0.0, 0.0), 25);
        assert!(url.contains("/18/"));
    }

    #[test]
    fn test_chrome_differs_per_theme() {
        let dark = ThemeChrome::for_theme(Theme::Dark);
        let light = ThemeChrome::for_theme(Theme::Light);
        assert_eq!(dark.container_background, "#242424");
        assert_eq!(light.container_background, "#ddd");
        assert_eq!(dark.button_label, "☀️ Light Mode");
        assert_eq!(light.button_label, "🌙 Dark Mode");
    }
}
