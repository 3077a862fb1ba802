//! Headless page state
//!
//! [`PageState`] is everything the user would see outside the map: the find
//! button, the status line, the share controls, the safety panel, the SOS
//! overlay, and every alert raised so far. [`UiContext`] is the shared handle
//! services use to change it; each change is logged and emitted on the event
//! bus.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use super::events::{Event, EventBus, StatusTone};
use crate::broadcast::templates::SHARE_READY_LABEL;
use crate::error::BroadcastError;
use crate::safety::SafetyVerdict;

pub const FIND_BUTTON_LABEL: &str = "Find Route 🚀";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindButton {
    pub enabled: bool,
    pub opacity: f32,
    pub label: String,
}

impl Default for FindButton {
    fn default() -> Self {
        Self {
            enabled: true,
            opacity: 1.0,
            label: FIND_BUTTON_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusLine {
    pub text: String,
    pub tone: StatusTone,
}

/// Verdict panel shown beside a found route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyPanel {
    pub message: String,
    pub details: String,
    pub safe: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SosOverlay {
    pub text: String,
    pub visible: bool,
    /// Alarm styling on the page while the SOS flow runs
    pub alarm: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageState {
    pub find_button: FindButton,
    pub status: Option<StatusLine>,
    pub share_controls_visible: bool,
    pub share_button_label: String,
    /// Created on the first found route and reused afterwards
    pub safety_panel: Option<SafetyPanel>,
    pub sos_overlay: SosOverlay,
    pub alerts: Vec<String>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            find_button: FindButton::default(),
            status: None,
            share_controls_visible: false,
            share_button_label: SHARE_READY_LABEL.to_string(),
            safety_panel: None,
            sos_overlay: SosOverlay::default(),
            alerts: Vec::new(),
        }
    }
}

impl PageState {
    pub fn disable_find(&mut self) {
        self.find_button.enabled = false;
        self.find_button.opacity = 0.7;
    }

    pub fn enable_find(&mut self) {
        self.find_button = FindButton::default();
    }

    pub fn show_safety_panel(&mut self, verdict: &SafetyVerdict) {
        let panel = self.safety_panel.get_or_insert_with(|| SafetyPanel {
            message: String::new(),
            details: String::new(),
            safe: false,
        });
        panel.message = verdict.message.clone();
        panel.details = verdict.details.clone();
        panel.safe = verdict.safe;
    }

    pub fn last_alert(&self) -> Option<&str> {
        self.alerts.last().map(String::as_str)
    }
}

/// Shared, cloneable access to the page and the event bus
#[derive(Clone)]
pub struct UiContext {
    page: Arc<Mutex<PageState>>,
    event_bus: EventBus,
    overlay_generation: Arc<Mutex<u64>>,
}

impl UiContext {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            page: Arc::new(Mutex::new(PageState::default())),
            event_bus,
            overlay_generation: Arc::new(Mutex::new(0)),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    /// Copy of the current page
    pub fn snapshot(&self) -> PageState {
        lock(&self.page).clone()
    }

    /// Mutate the page; the lock is released before returning
    pub fn update<R>(&self, f: impl FnOnce(&mut PageState) -> R) -> R {
        f(&mut lock(&self.page))
    }

    pub fn status(&self, text: impl Into<String>, tone: StatusTone) {
        let text = text.into();
        info!("Map status: {}", text);
        self.update(|page| {
            page.status = Some(StatusLine {
                text: text.clone(),
                tone,
            })
        });
        self.event_bus.emit(Event::StatusChanged { text, tone });
    }

    pub fn alert(&self, text: impl Into<String>) {
        let text = text.into();
        info!("Alert: {}", text);
        self.update(|page| page.alerts.push(text.clone()));
        self.event_bus.emit(Event::Alert { text });
    }

    pub fn link_opened(&self, url: &str, result: &Result<(), BroadcastError>) {
        self.event_bus.emit(Event::LinkOpened {
            url: url.to_string(),
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        });
    }

    /// Show the SOS overlay and return its generation for [`Self::hide_overlay`]
    pub fn show_overlay(&self, text: impl Into<String>) -> u64 {
        let text = text.into();
        let generation = {
            let mut generation = lock(&self.overlay_generation);
            *generation += 1;
            *generation
        };
        self.update(|page| {
            page.sos_overlay = SosOverlay {
                text: text.clone(),
                visible: true,
                alarm: true,
            }
        });
        self.event_bus.emit(Event::SosOverlay { text, visible: true });
        generation
    }

    /// Hide the overlay unless it was shown again since `generation`
    pub fn hide_overlay(&self, generation: u64) {
        if *lock(&self.overlay_generation) != generation {
            return;
        }
        let text = self.update(|page| {
            page.sos_overlay.visible = false;
            page.sos_overlay.alarm = false;
            page.sos_overlay.text.clone()
        });
        self.event_bus.emit(Event::SosOverlay { text, visible: false });
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Recovering poisoned lock");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::PlaceholderSafetyAnalyzer;

    #[test]
    fn test_default_page() {
        let page = PageState::default();
        assert!(page.find_button.enabled);
        assert_eq!(page.find_button.label, "Find Route 🚀");
        assert!(!page.share_controls_visible);
        assert!(page.safety_panel.is_none());
        assert!(!page.sos_overlay.visible);
    }

    #[test]
    fn test_find_button_toggle() {
        let mut page = PageState::default();
        page.disable_find();
        assert!(!page.find_button.enabled);
        assert_eq!(page.find_button.opacity, 0.7);
        page.enable_find();
        assert_eq!(page.find_button, FindButton::default());
    }

    #[test]
    fn test_safety_panel_created_once() {
        let mut page = PageState::default();
        let verdict = PlaceholderSafetyAnalyzer::verdict();
        page.show_safety_panel(&verdict);
        page.show_safety_panel(&verdict);
        let panel = page.safety_panel.unwrap();
        assert!(panel.message.contains("95% Safe"));
        assert!(panel.safe);
    }

    #[tokio::test]
    async fn test_status_and_alert_emit_events() {
        let ui = UiContext::new(EventBus::new(10));
        let mut events = ui.events().subscribe();

        ui.status("🔍 Searching for locations...", StatusTone::Info);
        ui.alert("Could not find location: Atlantis");

        let page = ui.snapshot();
        assert_eq!(page.status.unwrap().text, "🔍 Searching for locations...");
        assert_eq!(page.alerts, vec!["Could not find location: Atlantis"]);

        assert!(matches!(events.recv().await.unwrap(), Event::StatusChanged { .. }));
        assert!(matches!(events.recv().await.unwrap(), Event::Alert { .. }));
    }

    #[test]
    fn test_stale_overlay_hide_is_ignored() {
        let ui = UiContext::new(EventBus::new(10));
        let first = ui.show_overlay("first");
        let second = ui.show_overlay("second");

        ui.hide_overlay(first);
        assert!(ui.snapshot().sos_overlay.visible);

        ui.hide_overlay(second);
        let overlay = ui.snapshot().sos_overlay;
        assert!(!overlay.visible);
        assert!(!overlay.alarm);
    }
}
