//! Core `SttClient` trait and its result type.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

// ---------------------------------------------------------------------------
// SttProvider
// ---------------------------------------------------------------------------

/// Speech-to-text implementations, also used as registry keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SttProvider {
    /// OpenAI Whisper API.
    OpenAi,
    /// Aliyun DashScope speech recognition.
    Aliyun,
    /// Locally installed engines.
    Local,
    /// Cloud primary with an optional single-hop local fallback.
    Auto,
}

impl SttProvider {
    pub const ALL: [SttProvider; 4] = [
        SttProvider::OpenAi,
        SttProvider::Aliyun,
        SttProvider::Local,
        SttProvider::Auto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SttProvider::OpenAi => "openai",
            SttProvider::Aliyun => "aliyun",
            SttProvider::Local => "local",
            SttProvider::Auto => "auto",
        }
    }
}

impl Default for SttProvider {
    fn default() -> Self {
        SttProvider::Auto
    }
}

impl fmt::Display for SttProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SttProvider {
    type Err = NavError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SttProvider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| NavError::UnsupportedProvider(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// TranscriptionResult
// ---------------------------------------------------------------------------

/// Output of the one STT attempt that succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    /// Language code reported by (or requested from) the engine.
    pub language: String,
    /// The concrete engine that produced `text`; never [`SttProvider::Auto`].
    pub provider_used: SttProvider,
}

// ---------------------------------------------------------------------------
// SttClient trait
// ---------------------------------------------------------------------------

/// Transcribe audio to text.
///
/// Implementors must be `Send + Sync` so they can be shared across requests
/// behind an `Arc<dyn SttClient>`.  Cancellation is by drop: when the
/// request deadline fires the future is dropped, which aborts the HTTP call
/// or kills the local engine process.
#[async_trait]
pub trait SttClient: Send + Sync {
    /// Transcribe `audio`, encoded as `format` (`"wav"`, `"mp3"`, `"webm"`...).
    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<TranscriptionResult>;

    /// Human-readable name for logs and health output.
    fn provider_name(&self) -> String;
}

// Compile-time assertion: Box<dyn SttClient> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SttClient>) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_keys_round_trip() {
        for p in SttProvider::ALL {
            assert_eq!(p.as_str().parse::<SttProvider>().unwrap(), p);
        }
        assert!(matches!(
            "azure".parse::<SttProvider>(),
            Err(NavError::UnsupportedProvider(_))
        ));
    }

    #[test]
    fn serde_matches_keys() {
        assert_eq!(serde_json::to_string(&SttProvider::OpenAi).unwrap(), "\"openai\"");
    }
}
