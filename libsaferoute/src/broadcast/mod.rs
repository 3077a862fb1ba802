//! Location broadcasting through messaging links
//!
//! A broadcast composes one message and hands two links to a
//! [`LinkOpener`]: a WhatsApp share link and an SMS compose link. How a link
//! is "opened" depends on the opener: the platform URL handler, stdout for
//! dry runs, or an in-memory record for tests.

use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::error::BroadcastError;

pub mod links;
pub mod templates;

/// The two links carrying one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLinks {
    pub message: String,
    pub whatsapp: String,
    pub sms: String,
}

impl MessageLinks {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            whatsapp: links::whatsapp_link(&message),
            sms: links::sms_link(&message),
            message,
        }
    }
}

/// Opens a URL on behalf of the user
///
/// `open` may block; callers run it through [`open_logged`], which moves it
/// off the async runtime.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), BroadcastError>;

    fn name(&self) -> &str;
}

/// Hands links to the desktop/mobile URL handler without waiting for it
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), BroadcastError> {
        debug!("Opening {}", url);
        open::that_detached(url).map_err(|e| BroadcastError::OpenFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// Prints each link on its own line to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintingOpener;

impl LinkOpener for PrintingOpener {
    fn open(&self, url: &str) -> Result<(), BroadcastError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", url)
            .and_then(|_| stdout.flush())
            .map_err(|e| BroadcastError::OpenFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

/// Records opened links; optionally refuses links with a given prefix
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    opened: Arc<Mutex<Vec<String>>>,
    refuse_prefix: Option<String>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opener that fails for every URL starting with `prefix`
    pub fn refusing(prefix: &str) -> Self {
        Self {
            refuse_prefix: Some(prefix.to_string()),
            ..Self::default()
        }
    }

    /// Links opened successfully, in order
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<(), BroadcastError> {
        if let Some(prefix) = &self.refuse_prefix {
            if url.starts_with(prefix.as_str()) {
                return Err(BroadcastError::OpenFailed {
                    url: url.to_string(),
                    reason: "refused by recording opener".to_string(),
                });
            }
        }
        self.opened
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(url.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Open `url` on the blocking pool, logging a failure instead of
/// propagating it
pub async fn open_logged(opener: Arc<dyn LinkOpener>, url: &str) -> Result<(), BroadcastError> {
    let name = opener.name().to_string();
    let owned = url.to_string();
    let result = match tokio::task::spawn_blocking(move || opener.open(&owned)).await {
        Ok(result) => result,
        Err(e) => Err(BroadcastError::OpenFailed {
            url: url.to_string(),
            reason: format!("opener task ended abnormally: {}", e),
        }),
    };
    if let Err(e) = &result {
        warn!("{} opener failed: {}", name, e);
    }
    result
}
