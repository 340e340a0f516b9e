//! Aliyun DashScope speech recognition client.
//!
//! Audio is sent inline as base64 inside a JSON body.  DashScope reports
//! failures both as HTTP status codes and as a business `code` in an
//! otherwise successful response; both become [`NavError::Upstream`].

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::error::{NavError, Result};
use crate::stt::client::{SttClient, SttProvider, TranscriptionResult};

const DEFAULT_MODEL: &str = "paraformer-realtime-v2";
const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";
const RECOGNITION_PATH: &str = "/services/aigc/speech-generation/speech-recognition";
const SAMPLE_RATE: u32 = 16_000;
const PROVIDER_NAME: &str = "Aliyun";

#[derive(Debug, Deserialize)]
struct DashScopeResponse {
    #[serde(default)]
    output: Option<DashScopeOutput>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DashScopeOutput {
    #[serde(default)]
    result: Vec<DashScopeSentenceWrapper>,
}

#[derive(Debug, Deserialize)]
struct DashScopeSentenceWrapper {
    sentence: DashScopeSentence,
}

#[derive(Debug, Deserialize)]
struct DashScopeSentence {
    #[serde(default)]
    text: String,
}

/// DashScope recognition client.
pub struct AliyunSttClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    language: String,
}

impl AliyunSttClient {
    /// # Errors
    ///
    /// [`NavError::Configuration`] when no API key is configured.
    pub fn new(config: &ProviderConfig, language: &str) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| NavError::Configuration("Aliyun STT API key is empty".into()))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: config.model_or(DEFAULT_MODEL),
            base_url: config.base_url_or(DEFAULT_BASE_URL),
            language: language.to_string(),
        })
    }

    fn request_body(&self, audio: &[u8], format: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": {
                "format":      format,
                "sample_rate": SAMPLE_RATE,
                "language":    self.language,
                "data":        BASE64.encode(audio),
            }
        })
    }

    /// Turn an HTTP 200 body into a result, honouring the business code.
    fn parse_body(&self, body: &str) -> Result<TranscriptionResult> {
        let parsed: DashScopeResponse =
            serde_json::from_str(body).map_err(|e| NavError::Upstream {
                provider: PROVIDER_NAME.into(),
                status: Some(200),
                body: format!("malformed response ({e}): {body}"),
            })?;

        if let Some(code) = parsed.code.as_deref().filter(|c| !c.is_empty() && *c != "200") {
            return Err(NavError::Upstream {
                provider: PROVIDER_NAME.into(),
                status: Some(200),
                body: format!("{code}: {}", parsed.message.unwrap_or_default()),
            });
        }

        let sentences = parsed.output.map(|o| o.result).unwrap_or_default();
        if sentences.is_empty() {
            return Err(NavError::EmptyResponse(PROVIDER_NAME.into()));
        }

        let text: String = sentences.iter().map(|s| s.sentence.text.as_str()).collect();
        let text = text.trim();
        if text.is_empty() {
            return Err(NavError::EmptyResponse(PROVIDER_NAME.into()));
        }

        Ok(TranscriptionResult {
            text: text.to_string(),
            language: self.language.clone(),
            provider_used: SttProvider::Aliyun,
        })
    }
}

#[async_trait]
impl SttClient for AliyunSttClient {
    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<TranscriptionResult> {
        let url = format!("{}{RECOGNITION_PATH}", self.base_url);

        log::debug!("stt: sending {} bytes to {PROVIDER_NAME} ({})", audio.len(), self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(audio, format))
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
        format!("{PROVIDER_NAME} ({})", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AliyunSttClient {
        let config = ProviderConfig {
            api_key: Some("sk-test".into()),
            ..ProviderConfig::default()
        };
        AliyunSttClient::new(&config, "zh").unwrap()
    }

    #[test]
    fn missing_key_fails_at_construction() {
        let err = AliyunSttClient::new(&ProviderConfig::default(), "zh").err().unwrap();
        assert!(matches!(err, NavError::Configuration(_)));
    }

    #[test]
    fn request_body_carries_base64_audio() {
        let body = client().request_body(b"abc", "wav");
        assert_eq!(body["model"], "paraformer-realtime-v2");
        assert_eq!(body["input"]["format"], "wav");
        assert_eq!(body["input"]["sample_rate"], 16_000);
        assert_eq!(body["input"]["data"], "YWJj");
    }

    #[test]
    fn sentences_are_concatenated() {
        let body = r#"{"output": {"result": [
            {"sentence": {"text": "从长泰广场"}},
            {"sentence": {"text": "去七牛云"}}
        ]}, "request_id": "r1"}"#;
        let result = client().parse_body(body).unwrap();
        assert_eq!(result.text, "从长泰广场去七牛云");
        assert_eq!(result.provider_used, SttProvider::Aliyun);
    }

    #[test]
    fn business_error_code_is_upstream() {
        let body = r#"{"code": "InvalidApiKey", "message": "bad key"}"#;
        let err = client().parse_body(body).unwrap_err();
        match err {
            NavError::Upstream { body, .. } => assert!(body.contains("bad key")),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn code_200_is_success() {
        let body = r#"{"code": "200", "output": {"result": [{"sentence": {"text": "去西湖"}}]}}"#;
        assert_eq!(client().parse_body(body).unwrap().text, "去西湖");
    }

    #[test]
    fn empty_result_list_is_empty_response() {
        let err = client().parse_body(r#"{"output": {"result": []}}"#).unwrap_err();
        assert!(matches!(err, NavError::EmptyResponse(_)));
    }

    #[test]
    fn blank_sentences_are_empty_response() {
        let body = r#"{"output": {"result": [
            {"sentence": {"text": "  "}},
            {"sentence": {"text": ""}}
        ]}}"#;
        let err = client().parse_body(body).unwrap_err();
        assert!(matches!(err, NavError::EmptyResponse(_)));
    }
}
