//! Read-only provider registries built once at startup.
//!
//! A registry maps a provider key (`"deepseek"`, `"aliyun"`, ...) to a
//! constructed client.  Builders log and skip vendors whose client cannot be
//! constructed, so the orchestrator always starts with whatever subset is
//! usable.  After construction a registry is shared behind an `Arc` and never
//! mutated, so concurrent requests read it without locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{AiConfig, SttConfig};
use crate::error::{NavError, Result};
use crate::llm::{create_ai_client, AiIntentClient, AiProvider};
use crate::stt::{
    AliyunSttClient, AutoSttClient, LocalSttClient, OpenAiSttClient, SttClient, SttProvider,
};

// ---------------------------------------------------------------------------
// ProviderRegistry
// ---------------------------------------------------------------------------

/// Provider key → shared client.
pub struct ProviderRegistry<T: ?Sized> {
    clients: HashMap<String, Arc<T>>,
}

pub type AiRegistry = ProviderRegistry<dyn AiIntentClient>;
pub type SttRegistry = ProviderRegistry<dyn SttClient>;

impl<T: ?Sized> ProviderRegistry<T> {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Register `client` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, client: Arc<T>) {
        self.clients.insert(key.into(), client);
    }

    /// # Errors
    ///
    /// [`NavError::ProviderNotAvailable`] when nothing is registered under `key`.
    pub fn get(&self, key: &str) -> Result<Arc<T>> {
        self.clients
            .get(key)
            .cloned()
            .ok_or_else(|| NavError::ProviderNotAvailable(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.clients.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Registered keys in lexicographic order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<T: ?Sized> Default for ProviderRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// One client per AI vendor whose settings carry an API key.
pub fn build_ai_registry(config: &AiConfig) -> AiRegistry {
    let mut registry = AiRegistry::new();

    for provider in AiProvider::ALL {
        let settings = config.provider(provider);
        if settings.api_key().is_none() {
            log::debug!("registry: {provider} has no API key, skipped");
            continue;
        }
        match create_ai_client(provider, settings) {
            Ok(client) => {
                log::info!("registry: AI provider {} ready", client.provider_name());
                registry.insert(provider.as_str(), client);
            }
            Err(e) => log::warn!("registry: AI provider {provider} unavailable: {e}"),
        }
    }

    if registry.is_empty() {
        log::warn!(
            "registry: no AI provider configured, intents will come from the pattern matcher"
        );
    }
    registry
}

/// STT clients: configured cloud vendors, `local` always, and `auto` when a
/// cloud primary exists.
///
/// `auto` prefers Aliyun over OpenAI as primary and gets `local` as its
/// single fallback hop when `enable_fallback` is set.
pub fn build_stt_registry(config: &SttConfig) -> SttRegistry {
    let mut registry = SttRegistry::new();

    let openai: Option<Arc<dyn SttClient>> = cloud_client(
        SttProvider::OpenAi,
        config.openai.api_key().is_some(),
        || OpenAiSttClient::new(&config.openai, &config.language),
    );
    let aliyun: Option<Arc<dyn SttClient>> = cloud_client(
        SttProvider::Aliyun,
        config.aliyun.api_key().is_some(),
        || AliyunSttClient::new(&config.aliyun, &config.language),
    );
    let local: Arc<dyn SttClient> = Arc::new(LocalSttClient::new(
        config.local_model_path.as_deref(),
        &config.language,
    ));

    if let Some(primary) = aliyun.clone().or_else(|| openai.clone()) {
        let fallback = config.enable_fallback.then(|| Arc::clone(&local));
        let auto = AutoSttClient::new(primary, fallback);
        log::info!("registry: STT provider {} ready", auto.provider_name());
        registry.insert(SttProvider::Auto.as_str(), Arc::new(auto));
    }
    if let Some(client) = openai {
        registry.insert(SttProvider::OpenAi.as_str(), client);
    }
    if let Some(client) = aliyun {
        registry.insert(SttProvider::Aliyun.as_str(), client);
    }
    registry.insert(SttProvider::Local.as_str(), local);

    registry
}

fn cloud_client<C, F>(provider: SttProvider, has_key: bool, build: F) -> Option<Arc<dyn SttClient>>
where
    C: SttClient + 'static,
    F: FnOnce() -> Result<C>,
{
    if !has_key {
        log::debug!("registry: {provider} has no API key, skipped");
        return None;
    }
    match build() {
        Ok(client) => {
            log::info!("registry: STT provider {} ready", client.provider_name());
            Some(Arc::new(client))
        }
        Err(e) => {
            log::warn!("registry: STT provider {provider} unavailable: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn keyed(key: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: Some(key.into()),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn missing_key_is_provider_not_available() {
        let registry = AiRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get("claude"),
            Err(NavError::ProviderNotAvailable(ref k)) if k == "claude"
        ));
    }

    #[test]
    fn ai_registry_skips_vendors_without_keys() {
        let config = AiConfig {
            deepseek: keyed("sk-deepseek"),
            claude: keyed("sk-claude"),
            ..AiConfig::default()
        };
        let registry = build_ai_registry(&config);
        assert_eq!(registry.names(), ["claude", "deepseek"]);
        assert!(registry.get("chatgpt").is_err());
    }

    #[test]
    fn default_ai_registry_is_empty() {
        assert!(build_ai_registry(&AiConfig::default()).is_empty());
    }

    #[test]
    fn stt_registry_always_has_local() {
        let registry = build_stt_registry(&SttConfig::default());
        assert_eq!(registry.names(), ["local"]);
    }

    #[test]
    fn stt_registry_adds_auto_with_cloud_primary() {
        let config = SttConfig {
            aliyun: keyed("sk-aliyun"),
            openai: keyed("sk-openai"),
            ..SttConfig::default()
        };
        let registry = build_stt_registry(&config);
        assert_eq!(registry.names(), ["aliyun", "auto", "local", "openai"]);

        let auto = registry.get("auto").unwrap();
        let name = auto.provider_name();
        assert!(name.starts_with("Auto (Aliyun"), "{name}");
        assert!(name.contains("Local STT"), "{name}");
    }

    #[test]
    fn auto_without_fallback_has_single_hop() {
        let config = SttConfig {
            openai: keyed("sk-openai"),
            enable_fallback: false,
            ..SttConfig::default()
        };
        let registry = build_stt_registry(&config);
        let name = registry.get("auto").unwrap().provider_name();
        assert_eq!(name, "Auto (OpenAI Whisper)");
    }
}
