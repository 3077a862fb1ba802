//! Event system for workflow progress
//!
//! An in-process event bus built on `tokio::sync::broadcast`. Services emit
//! an event for every status-line change, alert, place resolution, routing
//! outcome and opened link; any number of subscribers (a CLI printing
//! progress, a test asserting on the sequence) can listen.
//!
//! Emitting never blocks. With no subscribers an event is simply dropped,
//! and a lagging subscriber loses the oldest events rather than slowing the
//! emitter down.
//!
//! # Example
//!
//! ```no_run
//! use libsaferoute::service::events::Event;
//! use libsaferoute::service::SafeRouteService;
//!
//! # async fn example() -> libsaferoute::Result<()> {
//! let service = SafeRouteService::new()?;
//! let mut events = service.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         if let Event::StatusChanged { text, .. } = event {
//!             eprintln!("{}", text);
//!         }
//!     }
//! });
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::map::overlays::OverlayId;
use crate::types::{Place, Theme};

pub type EventReceiver = broadcast::Receiver<Event>;

/// Broadcast channel fan-out for [`Event`]s
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// `capacity` is the per-subscriber buffer before old events are dropped
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receiver for every event emitted from now on
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: Event) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Severity of a status-line message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    StatusChanged {
        text: String,
        tone: StatusTone,
    },

    /// Modal message for the user
    Alert {
        text: String,
    },

    LocationResolved {
        request_id: String,
        query: String,
        /// `None` when the place could not be found
        place: Option<Place>,
    },

    RouteAnalyzed {
        request_id: String,
        safe: bool,
        message: String,
    },

    RoutesFound {
        request_id: String,
        control_id: OverlayId,
        distance_m: f64,
        duration_s: f64,
        /// False when a later render had already replaced the control
        applied: bool,
    },

    RoutingFailed {
        request_id: String,
        control_id: OverlayId,
        error: String,
        applied: bool,
    },

    ThemeChanged {
        theme: Theme,
    },

    LinkOpened {
        url: String,
        success: bool,
        error: Option<String>,
    },

    SosOverlay {
        text: String,
        visible: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_emitted_event() {
        let bus = EventBus::new(4);
        let mut events = bus.subscribe();

        let theme_changed = Event::ThemeChanged { theme: Theme::Light };
        bus.emit(theme_changed.clone());

        assert_eq!(events.recv().await.unwrap(), theme_changed);
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_alerts() {
        let bus = EventBus::new(4);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(Event::Alert {
            text: "hello".to_string(),
        });

        assert!(matches!(first.recv().await.unwrap(), Event::Alert { .. }));
        assert!(matches!(second.recv().await.unwrap(), Event::Alert { .. }));
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit(Event::Alert {
            text: "dropped".to_string(),
        });
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::StatusChanged {
            text: "✅ Safe Route Displayed".to_string(),
            tone: StatusTone::Success,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["tone"], "success");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
