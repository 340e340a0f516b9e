//! OpenAI Whisper API client.

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::error::{NavError, Result};
use crate::stt::client::{SttClient, SttProvider, TranscriptionResult};

const DEFAULT_MODEL: &str = "whisper-1";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER_NAME: &str = "OpenAI Whisper";

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    error: Option<WhisperError>,
}

#[derive(Debug, Deserialize)]
struct WhisperError {
    message: String,
}

/// Uploads audio to `/audio/transcriptions` as multipart form data.
pub struct OpenAiSttClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    language: String,
}

impl OpenAiSttClient {
    /// # Errors
    ///
    /// [`NavError::Configuration`] when no API key is configured.
    pub fn new(config: &ProviderConfig, language: &str) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| NavError::Configuration("OpenAI STT API key is empty".into()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: config.model_or(DEFAULT_MODEL),
            base_url: config.base_url_or(DEFAULT_BASE_URL),
            language: language.to_string(),
        })
    }

    /// Turn a 2xx response body into a result.
    fn parse_body(&self, body: &str) -> Result<TranscriptionResult> {
        let parsed: WhisperResponse = serde_json::from_str(body).map_err(|e| NavError::Upstream {
            provider: PROVIDER_NAME.into(),
            status: Some(200),
            body: format!("malformed response ({e}): {body}"),
        })?;

        if let Some(err) = parsed.error {
            return Err(NavError::Upstream {
                provider: PROVIDER_NAME.into(),
                status: Some(200),
                body: err.message,
            });
        }

        let text = parsed.text.trim().to_string();
        if text.is_empty() {
            return Err(NavError::EmptyResponse(PROVIDER_NAME.into()));
        }

        Ok(TranscriptionResult {
            text,
            language: parsed.language.unwrap_or_else(|| self.language.clone()),
            provider_used: SttProvider::OpenAi,
        })
    }
}

#[async_trait]
impl SttClient for OpenAiSttClient {
    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<TranscriptionResult> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = multipart::Part::bytes(audio.to_vec()).file_name(format!("audio.{format}"));
        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .part("file", file_part);

        log::debug!("stt: sending {} bytes to {PROVIDER_NAME} ({})", audio.len(), self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| NavError::transport(PROVIDER_NAME, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NavError::transport(PROVIDER_NAME, e))?;

        if !status.is_success() {
            return Err(NavError::Upstream {
                provider: PROVIDER_NAME.into(),
                status: Some(status.as_u16()),
                body,
            });
        }

        self.parse_body(&body)
    }

    fn provider_name(&self) -> String {
        PROVIDER_NAME.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiSttClient {
        let config = ProviderConfig {
            api_key: Some("sk-test".into()),
            ..ProviderConfig::default()
        };
        OpenAiSttClient::new(&config, "zh").unwrap()
    }

    #[test]
    fn missing_key_fails_at_construction() {
        let err = OpenAiSttClient::new(&ProviderConfig::default(), "zh").err().unwrap();
        assert!(matches!(err, NavError::Configuration(_)));
    }

    #[test]
    fn defaults_are_applied() {
        let c = client();
        assert_eq!(c.model, "whisper-1");
        assert_eq!(c.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn parses_text_and_language() {
        let result = client()
            .parse_body(r#"{"text": " 从北京到上海 ", "language": "chinese"}"#)
            .unwrap();
        assert_eq!(result.text, "从北京到上海");
        assert_eq!(result.language, "chinese");
        assert_eq!(result.provider_used, SttProvider::OpenAi);
    }

    #[test]
    fn missing_language_uses_requested_one() {
        let result = client().parse_body(r#"{"text": "去杭州"}"#).unwrap();
        assert_eq!(result.language, "zh");
    }

    #[test]
    fn embedded_error_is_upstream() {
        let err = client()
            .parse_body(r#"{"text": "", "error": {"message": "quota exceeded"}}"#)
            .unwrap_err();
        assert!(matches!(err, NavError::Upstream { ref body, .. } if body == "quota exceeded"));
    }

    #[test]
    fn blank_text_is_empty_response() {
        let err = client().parse_body(r#"{"text": "  "}"#).unwrap_err();
        assert!(matches!(err, NavError::EmptyResponse(_)));
    }
}
