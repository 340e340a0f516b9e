//! OpenAI-compatible chat-completions client, used for ChatGPT and DeepSeek.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::error::{NavError, Result};
use crate::intent::NavigationIntent;
use crate::llm::client::AiIntentClient;
use crate::llm::prompt::build_messages;
use crate::llm::response::parse_intent;

const TEMPERATURE: f64 = 0.3;

#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Extract the first choice's message content from a chat-completions body.
///
/// # Errors
///
/// - [`NavError::Upstream`] when the body is not a chat-completions envelope.
/// - [`NavError::EmptyResponse`] when there is no choice.
pub fn parse_chat_envelope(provider: &str, body: &str) -> Result<String> {
    let envelope: ChatEnvelope = serde_json::from_str(body).map_err(|e| NavError::Upstream {
        provider: provider.to_string(),
        status: Some(200),
        body: format!("malformed response ({e}): {body}"),
    })?;

    envelope
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| NavError::EmptyResponse(provider.to_string()))
}

/// Calls `{base_url}/chat/completions` with bearer authentication.
pub struct ChatCompletionClient {
    client: reqwest::Client,
    name: &'static str,
    api_key: String,
    model: String,
    base_url: String,
}

impl ChatCompletionClient {
    /// OpenAI ChatGPT, default `gpt-3.5-turbo`.
    pub fn chatgpt(config: &ProviderConfig) -> Result<Self> {
        Self::new("ChatGPT", config, "gpt-3.5-turbo", "https://api.openai.com/v1")
    }

    /// DeepSeek, default `deepseek-chat`.
    pub fn deepseek(config: &ProviderConfig) -> Result<Self> {
        Self::new("DeepSeek", config, "deepseek-chat", "https://api.deepseek.com/v1")
    }

    fn new(
        name: &'static str,
        config: &ProviderConfig,
        default_model: &str,
        default_base_url: &str,
    ) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| NavError::Configuration(format!("{name} API key is empty")))?;

        Ok(Self {
            client: reqwest::Client::new(),
            name,
            api_key: api_key.to_string(),
            model: config.model_or(default_model),
            base_url: config.base_url_or(default_base_url),
        })
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        let (system_msg, user_msg) = build_messages(text);
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "temperature": TEMPERATURE
        })
    }
}

#[async_trait]
impl AiIntentClient for ChatCompletionClient {
    async fn extract_intent(&self, text: &str) -> Result<NavigationIntent> {
        let url = format!("{}/chat/completions", self.base_url);
        log::debug!("llm: asking {} ({}) for an intent", self.name, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(|e| NavError::transport(self.name, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NavError::transport(self.name, e))?;

        if !status.is_success() {
            return Err(NavError::Upstream {
                provider: self.name.to_string(),
                status: Some(status.as_u16()),
                body,
            });
        }

        let content = parse_chat_envelope(self.name, &body)?;
        parse_intent(&content)
    }

    fn provider_name(&self) -> String {
        format!("{} ({})", self.name, self.model)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: Option<&str>, base_url: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: Some("sk-test".into()),
            model: model.map(String::from),
            base_url: base_url.map(String::from),
        }
    }

    #[test]
    fn vendor_defaults() {
        let c = ChatCompletionClient::chatgpt(&config(None, None)).unwrap();
        assert_eq!(c.model, "gpt-3.5-turbo");
        assert_eq!(c.base_url, "https://api.openai.com/v1");

        let c = ChatCompletionClient::deepseek(&config(None, None)).unwrap();
        assert_eq!(c.model, "deepseek-chat");
        assert_eq!(c.base_url, "https://api.deepseek.com/v1");
    }

    #[test]
    fn overrides_win() {
        let overrides = config(Some("gpt-4o-mini"), Some("http://proxy/v1/"));
        let c = ChatCompletionClient::chatgpt(&overrides).unwrap();
        assert_eq!(c.model, "gpt-4o-mini");
        assert_eq!(c.base_url, "http://proxy/v1");
    }

    #[test]
    fn request_body_shape() {
        let c = ChatCompletionClient::deepseek(&config(None, None)).unwrap();
        let body = c.request_body("去西湖");
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["temperature"], 0.3);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("去西湖"));
    }

    #[test]
    fn envelope_first_choice() {
        let body = r#"{"choices": [
            {"message": {"role": "assistant", "content": "{\"start\":\"北京\",\"end\":\"上海\"}"}}
        ]}"#;
        let content = parse_chat_envelope("ChatGPT", body).unwrap();
        let intent = parse_intent(&content).unwrap();
        assert_eq!(intent.start.as_deref(), Some("北京"));
        assert_eq!(intent.end.as_deref(), Some("上海"));
    }

    #[test]
    fn envelope_without_choices_is_empty_response() {
        let err = parse_chat_envelope("DeepSeek", r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, NavError::EmptyResponse(_)));
    }

    #[test]
    fn envelope_garbage_is_upstream() {
        let err = parse_chat_envelope("DeepSeek", "<html>").unwrap_err();
        assert!(matches!(err, NavError::Upstream { status: Some(200), .. }));
    }
}
