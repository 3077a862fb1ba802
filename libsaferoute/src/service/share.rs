//! Live-location sharing and SOS broadcasts
//!
//! Both flows read the device position, compose a message, open the
//! WhatsApp link right away and the SMS link after a short delay. A
//! positioning failure never stops a broadcast: sharing falls back to a link
//! for the typed destination, SOS falls back to naming the typed origin.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use super::ui::UiContext;
use crate::broadcast::templates::{self, PositionGuidance};
use crate::broadcast::{links, open_logged, LinkOpener, MessageLinks};
use crate::config::ShareConfig;
use crate::error::{BroadcastError, PositionError};
use crate::location::{Locator, PositionOptions};
use crate::types::DeviceFix;

/// Delay before the SOS overlay disappears after alerts went out
pub const SOS_SENT_HIDE_AFTER: Duration = Duration::from_secs(8);
/// Delay before the SOS overlay disappears after a positioning failure
pub const SOS_FAILED_HIDE_AFTER: Duration = Duration::from_secs(3);

/// Result of one broadcast; the SMS link may still be pending
pub struct BroadcastHandle {
    pub links: MessageLinks,
    /// Fix used in the message, if positioning succeeded
    pub fix: Option<DeviceFix>,
    pub position_error: Option<PositionError>,
    /// Outcome of opening the WhatsApp link
    pub whatsapp: Result<(), BroadcastError>,
    sms: JoinHandle<Result<(), BroadcastError>>,
}

impl BroadcastHandle {
    /// Wait until the SMS link has been opened
    pub async fn wait_sms(self) -> Result<(), BroadcastError> {
        match self.sms.await {
            Ok(result) => result,
            Err(e) => Err(BroadcastError::OpenFailed {
                url: self.links.sms.clone(),
                reason: format!("follow-up task ended abnormally: {}", e),
            }),
        }
    }

    pub fn message(&self) -> &str {
        &self.links.message
    }
}

#[derive(Clone)]
pub struct ShareService {
    locator: Locator,
    opener: Arc<dyn LinkOpener>,
    config: Arc<ShareConfig>,
    ui: UiContext,
}

impl ShareService {
    pub fn new(locator: Locator, opener: Arc<dyn LinkOpener>, config: Arc<ShareConfig>, ui: UiContext) -> Self {
        Self {
            locator,
            opener,
            config,
            ui,
        }
    }

    /// Share the live location, mentioning the route typed in `from`/`to`
    pub async fn share(&self, from: &str, to: &str) -> BroadcastHandle {
        self.ui
            .update(|page| page.share_button_label = templates::SHARE_LOCATING_LABEL.to_string());

        let (fix, position_error) = if self.locator.is_supported() {
            let options = PositionOptions::share(
                Duration::from_millis(self.config.share_timeout_ms),
                Duration::from_millis(self.config.share_max_age_ms),
            );
            match self.locator.locate(options).await {
                Ok(fix) => (Some(fix), None),
                Err(e) => {
                    self.ui.alert(templates::SHARE_GPS_FAILED_ALERT);
                    (None, Some(e))
                }
            }
        } else {
            self.ui.alert(templates::SHARE_UNSUPPORTED_ALERT);
            (None, None)
        };

        let map_link = match &fix {
            Some(fix) => links::coordinate_link(&self.config.maps_base, fix.position),
            None => {
                let to = to.trim();
                let target = if to.is_empty() { templates::DESTINATION } else { to };
                links::place_link(&self.config.maps_base, target)
            }
        };

        let message = templates::share_message(&self.config.app_name, from, to, &map_link);
        let handle = self
            .dispatch(
                message,
                fix,
                position_error,
                Duration::from_millis(self.config.share_sms_delay_ms),
            )
            .await;

        self.ui
            .update(|page| page.share_button_label = templates::SHARE_READY_LABEL.to_string());
        self.ui.alert(templates::SHARE_DONE_ALERT);
        info!("Live location share sent");
        handle
    }

    /// Send an SOS alert
    ///
    /// `near` is the last typed origin, named in the fallback message when
    /// the position cannot be read. The cache is never used.
    pub async fn sos(&self, near: &str) -> BroadcastHandle {
        warn!("SOS activated");
        self.ui.show_overlay(templates::SOS_ACCESSING_OVERLAY);

        let located = if self.locator.is_supported() {
            let options = PositionOptions::sos(Duration::from_millis(self.config.sos_timeout_ms));
            Some(self.locator.locate(options).await)
        } else {
            None
        };

        let sms_delay = Duration::from_millis(self.config.sos_sms_delay_ms);
        match located {
            Some(Err(error)) => {
                let guidance = PositionGuidance::for_error(error);
                self.ui.alert(guidance.alert());

                let message = templates::sos_fallback_message(near, guidance.message);
                let handle = self.dispatch(message, None, Some(error), sms_delay).await;

                let generation = self.ui.show_overlay(guidance.overlay());
                self.hide_overlay_after(generation, SOS_FAILED_HIDE_AFTER);
                handle
            }
            located => {
                let fix = located.and_then(|r| r.ok());
                let map_link = fix
                    .as_ref()
                    .map(|fix| links::coordinate_link(&self.config.maps_base, fix.position));

                let message = templates::sos_message(map_link.as_deref());
                let handle = self.dispatch(message, fix, None, sms_delay).await;

                let generation = self.ui.show_overlay(templates::SOS_SENT_OVERLAY);
                self.hide_overlay_after(generation, SOS_SENT_HIDE_AFTER);
                handle
            }
        }
    }

    /// Open the WhatsApp link now and the SMS link after `sms_delay`
    async fn dispatch(
        &self,
        message: String,
        fix: Option<DeviceFix>,
        position_error: Option<PositionError>,
        sms_delay: Duration,
    ) -> BroadcastHandle {
        let links = MessageLinks::new(message);

        let whatsapp = open_logged(Arc::clone(&self.opener), &links.whatsapp).await;
        self.ui.link_opened(&links.whatsapp, &whatsapp);

        let opener = Arc::clone(&self.opener);
        let ui = self.ui.clone();
        let sms_url = links.sms.clone();
        let sms = tokio::spawn(async move {
            sleep(sms_delay).await;
            let result = open_logged(opener, &sms_url).await;
            ui.link_opened(&sms_url, &result);
            result
        });

        BroadcastHandle {
            links,
            fix,
            position_error,
            whatsapp,
            sms,
        }
    }

    fn hide_overlay_after(&self, generation: u64, delay: Duration) {
        let ui = self.ui.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            ui.hide_overlay(generation);
        });
    }
}
