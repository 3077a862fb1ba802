//! Error types for SafeRoute

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SafeRouteError>;

#[derive(Error, Debug)]
pub enum SafeRouteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Geocoding error: {0}")]
    Geocoding(#[from] GeocodingError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Position error: {0}")]
    Position(#[from] PositionError),

    #[error("Broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),

    #[error("Could not find location: {0}")]
    LocationNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SafeRouteError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SafeRouteError::InvalidInput(_) => 3,
            SafeRouteError::LocationNotFound(_) => 2,
            SafeRouteError::Config(_) => 1,
            SafeRouteError::Geocoding(_) => 1,
            SafeRouteError::Routing(_) => 1,
            SafeRouteError::Position(_) => 1,
            SafeRouteError::Broadcast(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug, Clone)]
pub enum GeocodingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Geocoder responded with HTTP {0}")]
    Status(u16),

    #[error("Invalid geocoder response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Routing service responded with HTTP {0}")]
    Status(u16),

    #[error("No route found: {0}")]
    NoRoute(String),

    #[error("Invalid routing response: {0}")]
    InvalidResponse(String),

    #[error("Route task ended without an outcome")]
    Aborted,
}

/// Device positioning failures
///
/// Mirrors the fixed error-code enumeration of device geolocation APIs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timeout")]
    Timeout,
}

#[derive(Error, Debug, Clone)]
pub enum BroadcastError {
    #[error("Failed to open {url}: {reason}")]
    OpenFailed { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = SafeRouteError::InvalidInput("empty origin".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_location_not_found() {
        let error = SafeRouteError::LocationNotFound("Atlantis".to_string());
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_errors() {
        let routing = SafeRouteError::Routing(RoutingError::NoRoute("too far".to_string()));
        assert_eq!(routing.exit_code(), 1);

        let config = SafeRouteError::Config(ConfigError::MissingField("map".to_string()));
        assert_eq!(config.exit_code(), 1);

        let position = SafeRouteError::Position(PositionError::Timeout);
        assert_eq!(position.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_not_found() {
        let error = SafeRouteError::LocationNotFound("Atlantis".to_string());
        assert_eq!(error.to_string(), "Could not find location: Atlantis");
    }

    #[test]
    fn test_error_message_formatting_nested() {
        let error: SafeRouteError = RoutingError::Status(502).into();
        assert_eq!(
            error.to_string(),
            "Routing error: Routing service responded with HTTP 502"
        );

        let error: SafeRouteError = ConfigError::InvalidValue {
            field: "map.theme".to_string(),
            reason: "expected dark or light".to_string(),
        }
        .into();
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid value for map.theme: expected dark or light"
        );
    }

    #[test]
    fn test_position_error_display() {
        assert_eq!(PositionError::PermissionDenied.to_string(), "permission denied");
        assert_eq!(PositionError::PositionUnavailable.to_string(), "position unavailable");
        assert_eq!(PositionError::Timeout.to_string(), "timeout");
    }

    #[test]
    fn test_config_error_read_error_formatting() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let config_error = ConfigError::ReadError(io_error);
        assert!(config_error.to_string().contains("Failed to read config file"));
    }
}
