//! Message and alert texts for the share and SOS flows

use crate::error::PositionError;

pub const MY_LOCATION: &str = "My Location";
pub const DESTINATION: &str = "Destination";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";
pub const LOCATION_UNAVAILABLE: &str = "Location unavailable";

pub const SHARE_LOCATING_LABEL: &str = "🛰️ Locating...";
pub const SHARE_READY_LABEL: &str = "📱 Share Live Location on WhatsApp";

pub const SHARE_DONE_ALERT: &str = "✅ Live Link Generated!\n\nCheck WhatsApp and SMS to send.";
pub const SHARE_GPS_FAILED_ALERT: &str = "⚠️ GPS denied/failed. Sending destination link instead.";
pub const SHARE_UNSUPPORTED_ALERT: &str = "⚠️ Geolocation not supported. Sending destination link.";

pub const SOS_CONFIRM_PROMPT: &str = "🚨 ACTIVATE SOS? \n\nWe need to access your CURRENT LOCATION to share it with emergency contacts.\n\nClick OK to allow location access and send alert.";
pub const SOS_ACCESSING_OVERLAY: &str = "🛰️ Accessing GPS...\nPlease 'Allow' location access";
pub const SOS_SENT_OVERLAY: &str = "✅ Alerts Generated!\nWhatsApp & SMS opened.\nHIT SEND ON BOTH!";

/// Live-tracking message
///
/// `from`/`to` are the raw field values; the travelling wording is used only
/// when both contain text.
pub fn share_message(app_name: &str, from: &str, to: &str, map_link: &str) -> String {
    let from = from.trim();
    let to = to.trim();

    let body = if !from.is_empty() && !to.is_empty() {
        format!("I am travelling from *{}* to *{}*.", from, to)
    } else {
        "I am sharing my live location with you.".to_string()
    };

    format!(
        "*{app} Live Tracking*\n\n{body}\n\n📍 Track my REAL-TIME LOCATION here:\n{link}\n\n(Sent via {app})",
        app = app_name,
        body = body,
        link = map_link,
    )
}

/// SOS message carrying a map link, or [`LOCATION_UNAVAILABLE`]
pub fn sos_message(map_link: Option<&str>) -> String {
    format!(
        "🚨 SOS! EMERGENCY! I am in danger!\n\n📍 Location:\n{}\n\nPlease help immediately!",
        map_link.unwrap_or(LOCATION_UNAVAILABLE)
    )
}

/// SOS message sent when positioning failed, naming the typed origin
pub fn sos_fallback_message(origin: &str, error_message: &str) -> String {
    let origin = origin.trim();
    let near = if origin.is_empty() { UNKNOWN_LOCATION } else { origin };
    format!(
        "🚨 SOS! EMERGENCY! I am in danger!\n\n📍 Location Context: Near {}\n\n(GPS Error: {})",
        near, error_message
    )
}

/// User-facing description of a positioning failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionGuidance {
    pub message: &'static str,
    pub guidance: &'static str,
}

impl PositionGuidance {
    pub fn for_error(error: PositionError) -> Self {
        match error {
            PositionError::PermissionDenied => Self {
                message: "Location Access Denied.",
                guidance: "Please ALLOW location access in your device settings.",
            },
            PositionError::PositionUnavailable => Self {
                message: "Location Unavailable.",
                guidance: "GPS signal lost. Try moving outdoors.",
            },
            PositionError::Timeout => Self {
                message: "Location Timeout.",
                guidance: "GPS took too long. Retrying might help.",
            },
        }
    }

    pub fn alert(&self) -> String {
        format!(
            "⚠️ {}\n\n{}\n\nSwitching to manual location mode...",
            self.message, self.guidance
        )
    }

    pub fn overlay(&self) -> String {
        format!("⚠️ {}\nSending generic alerts...", self.message)
    }
}
