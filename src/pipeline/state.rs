//! Per-request stage machine.
//!
//! [`NavigationStage`] names where a request is in the pipeline.  The
//! orchestrator records the current stage in a [`StageTracker`] so that a
//! deadline that fires mid-flight can still report which stage was running.
//!
//! ```text
//! Received ──audio──▶ Transcribing ──▶ Extracting ──▶ UrlGenerating ──▶ Succeeded
//!     └─────text───────────────────────▲
//! any stage ──error / deadline──▶ Failed
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NavigationStage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum NavigationStage {
    Received,
    /// Skipped when the request already carries text.
    Transcribing,
    Extracting,
    UrlGenerating,
    Succeeded,
    Failed,
}

impl NavigationStage {
    const ORDER: [NavigationStage; 6] = [
        NavigationStage::Received,
        NavigationStage::Transcribing,
        NavigationStage::Extracting,
        NavigationStage::UrlGenerating,
        NavigationStage::Succeeded,
        NavigationStage::Failed,
    ];

    /// A short label for logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            NavigationStage::Received => "received",
            NavigationStage::Transcribing => "transcribing",
            NavigationStage::Extracting => "extracting",
            NavigationStage::UrlGenerating => "url_generating",
            NavigationStage::Succeeded => "succeeded",
            NavigationStage::Failed => "failed",
        }
    }

    /// `true` once the request has an outcome.
    ///
    /// ```
    /// use voice_nav::pipeline::NavigationStage;
    ///
    /// assert!(!NavigationStage::Extracting.is_terminal());
    /// assert!(NavigationStage::Succeeded.is_terminal());
    /// assert!(NavigationStage::Failed.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, NavigationStage::Succeeded | NavigationStage::Failed)
    }

    fn from_u8(value: u8) -> Self {
        Self::ORDER
            .get(value as usize)
            .copied()
            .unwrap_or(NavigationStage::Failed)
    }
}

impl fmt::Display for NavigationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// StageTracker
// ---------------------------------------------------------------------------

/// The current stage of one request, readable after its future is dropped.
#[derive(Debug)]
pub struct StageTracker(AtomicU8);

impl StageTracker {
    pub fn new() -> Self {
        Self(AtomicU8::new(NavigationStage::Received as u8))
    }

    pub fn enter(&self, stage: NavigationStage) {
        let previous = self.current();
        self.0.store(stage as u8, Ordering::Relaxed);
        log::debug!("pipeline: {previous} → {stage}");
    }

    pub fn current(&self) -> NavigationStage {
        NavigationStage::from_u8(self.0.load(Ordering::Relaxed))
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
