//! Core `AiIntentClient` trait, vendor keys and the client factory.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::error::{NavError, Result};
use crate::intent::NavigationIntent;
use crate::llm::chat::ChatCompletionClient;
use crate::llm::claude::ClaudeClient;

// ---------------------------------------------------------------------------
// AiProvider
// ---------------------------------------------------------------------------

/// LLM vendors able to extract a navigation intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    ChatGpt,
    Claude,
    DeepSeek,
}

impl AiProvider {
    pub const ALL: [AiProvider; 3] = [
        AiProvider::ChatGpt,
        AiProvider::Claude,
        AiProvider::DeepSeek,
    ];

    /// Registry key.
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::ChatGpt => "chatgpt",
            AiProvider::Claude => "claude",
            AiProvider::DeepSeek => "deepseek",
        }
    }
}

impl Default for AiProvider {
    fn default() -> Self {
        AiProvider::ChatGpt
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = NavError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AiProvider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| NavError::UnsupportedProvider(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// AiIntentClient trait
// ---------------------------------------------------------------------------

/// Async trait for LLM-backed intent extraction.
///
/// Implementors must be `Send + Sync` so one instance can serve concurrent
/// requests behind an `Arc<dyn AiIntentClient>`.
///
/// A successful call returns an intent whose `start` is `None` when the user
/// only named a destination; callers substitute the current position.
#[async_trait]
pub trait AiIntentClient: Send + Sync {
    async fn extract_intent(&self, text: &str) -> Result<NavigationIntent>;

    /// Human-readable vendor name for logs.
    fn provider_name(&self) -> String;
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Build the client for `provider` from its connection settings.
///
/// # Errors
///
/// [`NavError::Configuration`] when the API key is missing.
pub fn create_ai_client(
    provider: AiProvider,
    config: &ProviderConfig,
) -> Result<Arc<dyn AiIntentClient>> {
    let client: Arc<dyn AiIntentClient> = match provider {
        AiProvider::ChatGpt => Arc::new(ChatCompletionClient::chatgpt(config)?),
        AiProvider::DeepSeek => Arc::new(ChatCompletionClient::deepseek(config)?),
        AiProvider::Claude => Arc::new(ClaudeClient::new(config)?),
    };
    Ok(client)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_back() {
        for p in AiProvider::ALL {
            assert_eq!(p.as_str().parse::<AiProvider>().unwrap(), p);
        }
        assert!(matches!(
            "gemini".parse::<AiProvider>(),
            Err(NavError::UnsupportedProvider(_))
        ));
    }

    #[test]
    fn factory_requires_api_key() {
        for p in AiProvider::ALL {
            let err = create_ai_client(p, &ProviderConfig::default()).err().unwrap();
            assert!(matches!(err, NavError::Configuration(_)), "{p}: {err}");
        }
    }

    #[test]
    fn factory_builds_every_vendor() {
        let config = ProviderConfig {
            api_key: Some("sk-test".into()),
            ..ProviderConfig::default()
        };
        assert!(create_ai_client(AiProvider::ChatGpt, &config)
            .unwrap()
            .provider_name()
            .contains("ChatGPT"));
        assert!(create_ai_client(AiProvider::DeepSeek, &config)
            .unwrap()
            .provider_name()
            .contains("DeepSeek"));
        assert!(create_ai_client(AiProvider::Claude, &config)
            .unwrap()
            .provider_name()
            .contains("Claude"));
    }
}
