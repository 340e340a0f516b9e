//! Post-processing shared by every intent vendor.
//!
//! Vendors wrap the model's answer in different envelopes, but the answer
//! itself must be the `{"start": ..., "end": ...}` object requested by
//! [`INTENT_SYSTEM_PROMPT`](crate::llm::prompt::INTENT_SYSTEM_PROMPT).  Models
//! still like to wrap it in Markdown fences, so [`strip_code_fence`] runs
//! before parsing.

use serde::Deserialize;

use crate::error::{NavError, Result};
use crate::intent::{NavigationIntent, CONFIDENCE_LLM};

/// Labels a model sometimes leaves in front of the JSON payload.
const LEADING_LABELS: &[&str] = &["json", "JSON", "```json", "```"];

#[derive(Debug, Deserialize)]
struct RawIntent {
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

/// Remove Markdown code-fence wrapping (```` ```json ... ``` ````, bare
/// ```` ``` ```` fences) and stray leading `json` labels.
pub fn strip_code_fence(content: &str) -> String {
    let mut content = content.trim();

    for fence in ["```json", "```"] {
        if let Some(rest) = content.strip_prefix(fence) {
            content = rest.strip_suffix("```").unwrap_or(rest).trim();
        }
    }

    for label in LEADING_LABELS {
        if let Some(rest) = content.strip_prefix(label) {
            content = rest.trim();
        }
    }

    content.to_string()
}

/// Parse a model answer into a [`NavigationIntent`].
///
/// # Errors
///
/// [`NavError::IntentParse`] carrying the cleaned content when the answer is
/// not the agreed JSON object.
pub fn parse_intent(content: &str) -> Result<NavigationIntent> {
    let cleaned = strip_code_fence(content);
    let raw: RawIntent =
        serde_json::from_str(&cleaned).map_err(|e| NavError::IntentParse {
            reason: e.to_string(),
            content: cleaned.clone(),
        })?;
    Ok(NavigationIntent::new(raw.start, raw.end, CONFIDENCE_LLM))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
