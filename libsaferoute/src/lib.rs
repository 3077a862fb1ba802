//! SafeRoute - route sharing and emergency location broadcasting
//!
//! This library resolves place names, draws a route between them on a
//! headless map model, and composes messaging links that share the user's
//! live location, including an SOS flow.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod location;
pub mod logging;
pub mod map;
pub mod rate_limiter;
pub mod routing;
pub mod safety;
pub mod service;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SafeRouteError};
pub use map::MapSession;
pub use service::SafeRouteService;
pub use types::{DeviceFix, LatLng, Place, RouteRequest, Theme};
