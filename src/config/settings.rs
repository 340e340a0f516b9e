//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every section is `#[serde(default)]`, so a partial `settings.toml` only
//! needs the values it overrides.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::llm::AiProvider;
use crate::map::MapProvider;
use crate::stt::SttProvider;

// ---------------------------------------------------------------------------
// ProviderConfig
// ---------------------------------------------------------------------------

/// Connection details for one vendor (AI or STT).
///
/// A vendor without an API key is left out of its registry; `model` and
/// `base_url` fall back to the vendor's defaults when `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// The API key, if present and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        non_blank(&self.api_key)
    }

    /// The model name, or `default` when unset.
    pub fn model_or(&self, default: &str) -> String {
        non_blank(&self.model).unwrap_or(default).to_string()
    }

    /// The base URL without a trailing slash, or `default` when unset.
    pub fn base_url_or(&self, default: &str) -> String {
        non_blank(&self.base_url)
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    fn expand_env(&mut self) {
        for field in [&mut self.api_key, &mut self.model, &mut self.base_url] {
            *field = field.take().map(|v| expand_env_var(&v));
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Which STT client serves requests that do not name one.
    pub provider: SttProvider,
    /// Let `auto` retry once against the local engines when the cloud
    /// primary fails.
    pub enable_fallback: bool,
    /// Recognition language handed to every engine.
    pub language: String,
    /// Directory holding whisper.cpp `ggml-*.bin` models.
    pub local_model_path: Option<String>,
    /// OpenAI Whisper API.
    pub openai: ProviderConfig,
    /// Aliyun DashScope speech recognition.
    pub aliyun: ProviderConfig,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: SttProvider::Auto,
            enable_fallback: true,
            language: "zh".into(),
            local_model_path: None,
            openai: ProviderConfig::default(),
            aliyun: ProviderConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// AiConfig
// ---------------------------------------------------------------------------

/// Intent-extraction vendors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Vendor used when a request does not name one.
    pub default_provider: AiProvider,
    pub chatgpt: ProviderConfig,
    pub claude: ProviderConfig,
    pub deepseek: ProviderConfig,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_provider: AiProvider::ChatGpt,
            chatgpt: ProviderConfig::default(),
            claude: ProviderConfig::default(),
            deepseek: ProviderConfig::default(),
        }
    }
}

impl AiConfig {
    /// Connection details for `provider`.
    pub fn provider(&self, provider: AiProvider) -> &ProviderConfig {
        match provider {
            AiProvider::ChatGpt => &self.chatgpt,
            AiProvider::Claude => &self.claude,
            AiProvider::DeepSeek => &self.deepseek,
        }
    }
}

// ---------------------------------------------------------------------------
// MapConfig / NavigationConfig
// ---------------------------------------------------------------------------

/// Map URL settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Provider used when a request does not name one.
    pub default_provider: MapProvider,
}

/// Per-request behaviour of the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// End-to-end deadline for one navigation request.
    pub timeout_secs: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use voice_nav::config::AppConfig;
///
/// // Returns defaults when the file is missing.
/// let config = AppConfig::load().unwrap();
/// assert!(config.navigation.timeout_secs > 0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stt: SttConfig,
    pub ai: AiConfig,
    pub map: MapConfig,
    pub navigation: NavigationConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    ///
    /// A missing file yields the defaults.  `${VAR}` / `${VAR:-default}`
    /// references in vendor settings are expanded from the environment, then
    /// the result is validated.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            log::info!("config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.expand_env();
        config.validate()?;
        Ok(config)
    }

    /// Save to the platform-appropriate `settings.toml`.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the orchestrator cannot run with.
    ///
    /// Provider names are already checked by deserialisation; missing
    /// credentials are never an error.
    pub fn validate(&self) -> Result<()> {
        if self.navigation.timeout_secs == 0 {
            bail!("navigation.timeout_secs must be greater than zero");
        }
        if self.stt.language.trim().is_empty() {
            bail!("stt.language must not be empty");
        }
        Ok(())
    }

    fn expand_env(&mut self) {
        self.stt.openai.expand_env();
        self.stt.aliyun.expand_env();
        self.stt.local_model_path = self.stt.local_model_path.take().map(|p| expand_env_var(&p));
        self.ai.chatgpt.expand_env();
        self.ai.claude.expand_env();
        self.ai.deepseek.expand_env();
    }
}

// ---------------------------------------------------------------------------
// Environment expansion
// ---------------------------------------------------------------------------

/// Expand a whole-value `${VAR}` or `${VAR:-default}` reference.
///
/// Anything not wrapped in `${...}` is returned unchanged.  An unset or empty
/// variable yields the default, or an empty string when there is none.
pub fn expand_env_var(value: &str) -> String {
    let Some(inner) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) else {
        return value.to_string();
    };

    let (name, default) = match inner.split_once(":-") {
        Some((name, default)) => (name, Some(default)),
        None => (inner, None),
    };

    match std::env::var(name) {
        Ok(v) if !v.is_empty() => v,
        _ => default.unwrap_or_default().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.stt.provider, SttProvider::Auto);
        assert!(cfg.stt.enable_fallback);
        assert_eq!(cfg.stt.language, "zh");
        assert_eq!(cfg.ai.default_provider, AiProvider::ChatGpt);
        assert_eq!(cfg.map.default_provider, MapProvider::Baidu);
        assert_eq!(cfg.navigation.timeout_secs, 30);
        assert!(cfg.ai.chatgpt.api_key().is_none());
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let config = AppConfig::load_from(&dir.path().join("nope.toml")).expect("load");
        assert_eq!(config.navigation.timeout_secs, 30);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.ai.default_provider = AiProvider::DeepSeek;
        cfg.ai.deepseek.api_key = Some("sk-test".into());
        cfg.map.default_provider = MapProvider::Amap;
        cfg.stt.provider = SttProvider::Local;
        cfg.navigation.timeout_secs = 12;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.ai.default_provider, AiProvider::DeepSeek);
        assert_eq!(loaded.ai.deepseek.api_key(), Some("sk-test"));
        assert_eq!(loaded.map.default_provider, MapProvider::Amap);
        assert_eq!(loaded.stt.provider, SttProvider::Local);
        assert_eq!(loaded.navigation.timeout_secs, 12);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[map]\ndefault_provider = \"google\"\n").unwrap();

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.map.default_provider, MapProvider::Google);
        assert_eq!(loaded.ai.default_provider, AiProvider::ChatGpt);
        assert_eq!(loaded.navigation.timeout_secs, 30);
    }

    #[test]
    fn unknown_map_provider_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[map]\ndefault_provider = \"bing\"\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[navigation]\ntimeout_secs = 0\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn env_references_are_expanded_on_load() {
        std::env::set_var("VOICE_NAV_TEST_CLAUDE_KEY", "sk-from-env");
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "[ai.claude]\napi_key = \"${VOICE_NAV_TEST_CLAUDE_KEY}\"\n\
             model = \"${VOICE_NAV_TEST_UNSET_MODEL:-claude-x}\"\n",
        )
        .unwrap();

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.ai.claude.api_key(), Some("sk-from-env"));
        assert_eq!(loaded.ai.claude.model.as_deref(), Some("claude-x"));
    }

    #[test]
    fn expand_env_var_forms() {
        assert_eq!(expand_env_var("plain"), "plain");
        assert_eq!(expand_env_var("${VOICE_NAV_TEST_NEVER_SET}"), "");
        assert_eq!(expand_env_var("${VOICE_NAV_TEST_NEVER_SET:-fallback}"), "fallback");
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = ProviderConfig {
            api_key: Some("   ".into()),
            ..ProviderConfig::default()
        };
        assert!(cfg.api_key().is_none());
        assert_eq!(cfg.model_or("m"), "m");
        assert_eq!(cfg.base_url_or("https://x/v1/"), "https://x/v1");
    }
}
