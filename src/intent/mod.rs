//! Navigation intent: the structured `(start, end)` pair extracted from text.
//!
//! Two extraction tiers produce a [`NavigationIntent`]:
//! * the LLM-backed clients in [`crate::llm`], and
//! * the deterministic [`IntentPatternMatcher`] used when no LLM is
//!   configured at all.

pub mod pattern;

pub use pattern::{is_valid_location, IntentPatternMatcher};

use serde::{Deserialize, Serialize};

/// Literal the language model uses for "the user did not name a start".
///
/// Extractors turn it into an absent start; the orchestrator substitutes it
/// back right before URL generation.
pub const CURRENT_LOCATION: &str = "当前位置";

/// Confidence of a two-endpoint pattern match.
pub const CONFIDENCE_FULL_ROUTE: f64 = 0.9;
/// Confidence of a destination-only pattern match.
pub const CONFIDENCE_DESTINATION_ONLY: f64 = 0.7;
/// Confidence attached to anything a language model resolved.
pub const CONFIDENCE_LLM: f64 = 1.0;

// ---------------------------------------------------------------------------
// NavigationIntent
// ---------------------------------------------------------------------------

/// A resolved (or unresolved) navigation request.
///
/// `start == None` means "use the current location".  An intent with
/// `confidence == 0` has both endpoints absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationIntent {
    pub start: Option<String>,
    pub end: Option<String>,
    /// Pattern specificity in `[0, 1]`, not a statistical probability.
    pub confidence: f64,
}

impl NavigationIntent {
    /// The "nothing recognised" intent.
    pub fn unresolved() -> Self {
        Self {
            start: None,
            end: None,
            confidence: 0.0,
        }
    }

    /// Build an intent from raw extractor output.
    ///
    /// Blank strings and the [`CURRENT_LOCATION`] placeholder become `None`.
    /// If both endpoints end up absent the result is [`unresolved`].
    ///
    /// [`unresolved`]: NavigationIntent::unresolved
    pub fn new(start: Option<String>, end: Option<String>, confidence: f64) -> Self {
        let start = normalize_endpoint(start);
        let end = normalize_endpoint(end);
        if start.is_none() && end.is_none() {
            return Self::unresolved();
        }
        Self {
            start,
            end,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// `true` when at least one endpoint is known.
    pub fn is_resolved(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Drop endpoints that fail [`is_valid_location`] (e.g. `"这里"`).
    pub fn retain_valid_locations(self) -> Self {
        let start = self.start.filter(|s| is_valid_location(s));
        let end = self.end.filter(|e| is_valid_location(e));
        Self::new(start, end, self.confidence)
    }
}

fn normalize_endpoint(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != CURRENT_LOCATION)
}

/// Render an intent as a short multi-line summary.
pub fn format_intent(intent: &NavigationIntent) -> String {
    let start = intent.start.as_deref().unwrap_or("未指定");
    let end = intent.end.as_deref().unwrap_or("未指定");
    let percent = (intent.confidence * 100.0).round() as i64;
    format!("起点：{start}\n终点：{end}\n置信度：{percent}%")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
