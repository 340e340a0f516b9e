//! Public request/response pair of the orchestrator.

use serde::{Deserialize, Serialize};

use crate::map::MapProvider;
use crate::stt::SttProvider;

/// What the user supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NavigationInput {
    /// Typed text, goes straight to intent extraction.
    Text { text: String },
    /// Base64 audio, optionally with a `data:audio/...;base64,` prefix.
    Audio { data: String, format: String },
}

/// One navigation request.  Provider keys left `None` use the configured
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationRequest {
    #[serde(flatten)]
    pub input: NavigationInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stt_provider: Option<String>,
}

impl NavigationRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_input(NavigationInput::Text { text: text.into() })
    }

    pub fn audio(data: impl Into<String>, format: impl Into<String>) -> Self {
        Self::from_input(NavigationInput::Audio {
            data: data.into(),
            format: format.into(),
        })
    }

    fn from_input(input: NavigationInput) -> Self {
        Self {
            input,
            ai_provider: None,
            map_provider: None,
            stt_provider: None,
        }
    }

    pub fn with_ai_provider(mut self, key: impl Into<String>) -> Self {
        self.ai_provider = Some(key.into());
        self
    }

    pub fn with_map_provider(mut self, key: impl Into<String>) -> Self {
        self.map_provider = Some(key.into());
        self
    }

    pub fn with_stt_provider(mut self, key: impl Into<String>) -> Self {
        self.stt_provider = Some(key.into());
        self
    }
}

/// A successful navigation.
///
/// The provider fields name the clients that actually served the request,
/// not the configured defaults.  `stt_provider` is the concrete engine
/// (never `auto`) and is `None` for text input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationResponse {
    pub start: String,
    pub end: String,
    pub url: String,
    /// The text intent extraction ran on.
    pub recognized_text: String,
    pub stt_provider: Option<SttProvider>,
    /// AI registry key, or `"pattern"` for the regex tier.
    pub ai_provider: String,
    pub map_provider: MapProvider,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_request_from_json() {
        let req: NavigationRequest = serde_json::from_str(
            r#"{"type": "text", "text": "去西湖", "map_provider": "amap"}"#,
        )
        .unwrap();
        assert_eq!(req, NavigationRequest::text("去西湖").with_map_provider("amap"));
    }

    #[test]
    fn audio_request_from_json() {
        let req: NavigationRequest = serde_json::from_str(
            r#"{"type": "audio", "data": "UklGRg==", "format": "wav", "stt_provider": "local"}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            NavigationRequest::audio("UklGRg==", "wav").with_stt_provider("local")
        );
    }
}
