//! Route safety verdicts
//!
//! Only a placeholder exists: [`PlaceholderSafetyAnalyzer`] waits a fixed
//! delay and then reports a canned "safe" verdict. It consults no data and
//! must not be mistaken for a real analysis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub safe: bool,
    pub message: String,
    pub details: String,
}

#[async_trait]
pub trait SafetyAnalyzer: Send + Sync {
    /// Produce a verdict for the route about to be drawn. Never fails.
    async fn analyze(&self) -> SafetyVerdict;
}

/// Always-safe stub with artificial latency
#[derive(Debug, Clone)]
pub struct PlaceholderSafetyAnalyzer {
    delay: Duration,
}

impl PlaceholderSafetyAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn verdict() -> SafetyVerdict {
        SafetyVerdict {
            safe: true,
            message: "AI Safety Analysis: Route is 95% Safe. Avoiding unlit areas.".to_string(),
            details: "Verified with police heatmap and street light database.".to_string(),
        }
    }
}

impl Default for PlaceholderSafetyAnalyzer {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl SafetyAnalyzer for PlaceholderSafetyAnalyzer {
    async fn analyze(&self) -> SafetyVerdict {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        info!("Placeholder safety verdict issued (no analysis performed)");
        Self::verdict()
    }
}
