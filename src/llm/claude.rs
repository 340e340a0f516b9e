//! Anthropic messages API client.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::error::{NavError, Result};
use crate::intent::NavigationIntent;
use crate::llm::client::AiIntentClient;
use crate::llm::prompt::build_messages;
use crate::llm::response::parse_intent;

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;
const PROVIDER_NAME: &str = "Claude";

#[derive(Debug, Deserialize)]
struct MessagesEnvelope {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Extract the first content block's text from a messages API body.
pub fn parse_messages_envelope(body: &str) -> Result<String> {
    let envelope: MessagesEnvelope =
        serde_json::from_str(body).map_err(|e| NavError::Upstream {
            provider: PROVIDER_NAME.into(),
            status: Some(200),
            body: format!("malformed response ({e}): {body}"),
        })?;

    envelope
        .content
        .into_iter()
        .next()
        .map(|block| block.text)
        .ok_or_else(|| NavError::EmptyResponse(PROVIDER_NAME.into()))
}

/// Calls `{base_url}/messages` with `x-api-key` authentication.
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeClient {
    /// # Errors
    ///
    /// [`NavError::Configuration`] when no API key is configured.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| NavError::Configuration("Claude API key is empty".into()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: config.model_or(DEFAULT_MODEL),
            base_url: config.base_url_or(DEFAULT_BASE_URL),
        })
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        let (system_msg, user_msg) = build_messages(text);
        serde_json::json!({
            "model":      self.model,
            "max_tokens": MAX_TOKENS,
            "system":     system_msg,
            "messages": [
                { "role": "user", "content": user_msg }
            ]
        })
    }
}

#[async_trait]
impl AiIntentClient for ClaudeClient {
    async fn extract_intent(&self, text: &str) -> Result<NavigationIntent> {
        let url = format!("{}/messages", self.base_url);
        log::debug!("llm: asking {PROVIDER_NAME} ({}) for an intent", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(text))
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

        parse_intent(&parse_messages_envelope(&body)?)
    }

    fn provider_name(&self) -> String {
        format!("{PROVIDER_NAME} ({})", self.model)
    }
}
