//! Cloud-first STT client with a single local fallback hop.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::stt::client::{SttClient, TranscriptionResult};

/// Tries `primary`; on any error retries exactly once against `fallback`.
///
/// Without a fallback the primary's error propagates unchanged.  The
/// fallback's own error is never retried.
pub struct AutoSttClient {
    primary: Arc<dyn SttClient>,
    fallback: Option<Arc<dyn SttClient>>,
}

impl AutoSttClient {
    pub fn new(primary: Arc<dyn SttClient>, fallback: Option<Arc<dyn SttClient>>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SttClient for AutoSttClient {
    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<TranscriptionResult> {
        let err = match self.primary.transcribe(audio, format).await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(err);
        };

        log::warn!(
            "stt: {} failed ({err}), falling back to {}",
            self.primary.provider_name(),
            fallback.provider_name()
        );
        fallback.transcribe(audio, format).await
    }

    fn provider_name(&self) -> String {
        match &self.fallback {
            Some(fallback) => format!(
                "Auto ({} -> {})",
                self.primary.provider_name(),
                fallback.provider_name()
            ),
            None => format!("Auto ({})", self.primary.provider_name()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
