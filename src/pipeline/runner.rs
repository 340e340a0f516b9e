//! Navigation orchestrator: STT → intent extraction → map URL, under one
//! deadline.
//!
//! # Pipeline flow
//!
//! ```text
//! NavigationRequest
//!   ├─ Audio → decode base64 → stt.transcribe            [Transcribing]
//!   │            └─ sentinel text → SttUnavailable
//!   ├─ AI registry non-empty → ai.extract_intent          [Extracting]
//!   │  AI registry empty     → IntentPatternMatcher
//!   │            └─ no endpoint → NoLocation
//!   └─ start defaults to 当前位置 → map::generate          [UrlGenerating]
//! ```
//!
//! The whole chain runs inside `tokio::time::timeout`.  When the deadline
//! fires the in-flight future is dropped: HTTP requests are aborted and
//! local engine processes are killed.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::{NavError, Result};
use crate::intent::{IntentPatternMatcher, NavigationIntent, CURRENT_LOCATION};
use crate::llm::AiProvider;
use crate::map::{self, MapProvider};
use crate::registry::{build_ai_registry, build_stt_registry, AiRegistry, SttRegistry};
use crate::stt::{SttProvider, TranscriptionResult, STT_UNAVAILABLE_SENTINEL};

use super::request::{NavigationInput, NavigationRequest, NavigationResponse};
use super::state::{NavigationStage, StageTracker};

/// `ai_provider` reported when the regex tier served the request.
pub const PATTERN_PROVIDER: &str = "pattern";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// A failed request: the error plus the stage it happened in.
#[derive(Debug, Error)]
#[error("{stage}: {error}")]
pub struct PipelineError {
    pub stage: NavigationStage,
    #[source]
    pub error: NavError,
}

impl PipelineError {
    fn new(stage: NavigationStage, error: NavError) -> Self {
        Self { stage, error }
    }

    /// Machine-readable error code, see [`NavError::kind`].
    pub fn kind(&self) -> &'static str {
        self.error.kind()
    }

    /// Human-readable description for the end user.
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

// ---------------------------------------------------------------------------
// NavigationOrchestrator
// ---------------------------------------------------------------------------

/// Composes the registries into a request handler.
///
/// Cheap to share: registries sit behind `Arc` and nothing is mutated per
/// request, so one instance can serve concurrent `navigate` calls.
///
/// ```rust,no_run
/// use voice_nav::config::AppConfig;
/// use voice_nav::pipeline::{NavigationOrchestrator, NavigationRequest};
///
/// # async fn example() {
/// let orchestrator = NavigationOrchestrator::from_config(&AppConfig::default());
/// match orchestrator.navigate(NavigationRequest::text("从长泰广场去七牛云")).await {
///     Ok(response) => println!("{}", response.url),
///     Err(e) => eprintln!("{} ({})", e.message(), e.kind()),
/// }
/// # }
/// ```
pub struct NavigationOrchestrator {
    ai: Arc<AiRegistry>,
    stt: Arc<SttRegistry>,
    matcher: IntentPatternMatcher,
    default_ai: String,
    default_stt: String,
    default_map: MapProvider,
    timeout: Duration,
}

impl NavigationOrchestrator {
    /// Orchestrator over prebuilt registries with built-in defaults
    /// (`chatgpt`, `local`, Baidu, 30 s).
    pub fn new(ai: Arc<AiRegistry>, stt: Arc<SttRegistry>) -> Self {
        Self {
            ai,
            stt,
            matcher: IntentPatternMatcher::new(),
            default_ai: AiProvider::default().as_str().to_string(),
            default_stt: SttProvider::Local.as_str().to_string(),
            default_map: MapProvider::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build both registries from `config` and apply its defaults.
    ///
    /// A configured default that did not make it into its registry is
    /// replaced: STT falls back to `local`, AI to the first available vendor.
    pub fn from_config(config: &AppConfig) -> Self {
        let ai = build_ai_registry(&config.ai);
        let stt = build_stt_registry(&config.stt);

        let mut default_ai = config.ai.default_provider.as_str().to_string();
        if !ai.is_empty() && !ai.contains(&default_ai) {
            if let Some(first) = ai.names().into_iter().next() {
                log::warn!(
                    "orchestrator: default AI provider {default_ai} not configured, using {first}"
                );
                default_ai = first;
            }
        }

        let mut default_stt = config.stt.provider.as_str().to_string();
        if !stt.contains(&default_stt) {
            log::warn!("orchestrator: STT provider {default_stt} not configured, using local");
            default_stt = SttProvider::Local.as_str().to_string();
        }

        Self::new(Arc::new(ai), Arc::new(stt))
            .with_default_ai(default_ai)
            .with_default_stt(default_stt)
            .with_default_map(config.map.default_provider)
            .with_timeout(Duration::from_secs(config.navigation.timeout_secs))
    }

    pub fn with_default_ai(mut self, key: impl Into<String>) -> Self {
        self.default_ai = key.into();
        self
    }

    pub fn with_default_stt(mut self, key: impl Into<String>) -> Self {
        self.default_stt = key.into();
        self
    }

    pub fn with_default_map(mut self, provider: MapProvider) -> Self {
        self.default_map = provider;
        self
    }

    /// Request deadline.  A zero duration keeps the 30 s default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            log::warn!("orchestrator: ignoring zero timeout, using {DEFAULT_TIMEOUT:?}");
            self.timeout = DEFAULT_TIMEOUT;
        } else {
            self.timeout = timeout;
        }
        self
    }

    /// Configured AI vendor keys, sorted.  Empty means regex-only operation.
    pub fn available_ai_providers(&self) -> Vec<String> {
        self.ai.names()
    }

    /// Registered STT keys, sorted.
    pub fn stt_provider_names(&self) -> Vec<String> {
        self.stt.names()
    }

    // -----------------------------------------------------------------------
    // Request handling
    // -----------------------------------------------------------------------

    /// Run one request to completion or until the deadline.
    pub async fn navigate(
        &self,
        request: NavigationRequest,
    ) -> std::result::Result<NavigationResponse, PipelineError> {
        let tracker = StageTracker::new();

        let outcome = match tokio::time::timeout(self.timeout, self.run(&request, &tracker)).await {
            Ok(result) => result.map_err(|e| PipelineError::new(tracker.current(), e)),
            Err(_) => Err(PipelineError::new(
                tracker.current(),
                NavError::Timeout(self.timeout),
            )),
        };

        match &outcome {
            Ok(response) => {
                log::info!(
                    "navigation: {} -> {} via {} / {}",
                    response.start,
                    response.end,
                    response.ai_provider,
                    response.map_provider
                );
            }
            Err(e) => {
                tracker.enter(NavigationStage::Failed);
                log::warn!("navigation failed during {}: {} ({})", e.stage, e.error, e.kind());
            }
        }
        outcome
    }

    async fn run(
        &self,
        request: &NavigationRequest,
        tracker: &StageTracker,
    ) -> Result<NavigationResponse> {
        let (text, stt_used) = match &request.input {
            NavigationInput::Text { text } => {
                if text.trim().is_empty() {
                    return Err(NavError::Validation("text must not be empty".into()));
                }
                (text.clone(), None)
            }
            NavigationInput::Audio { data, format } => {
                tracker.enter(NavigationStage::Transcribing);
                let result = self
                    .transcribe(request.stt_provider.as_deref(), data, format)
                    .await?;
                log::debug!("pipeline: STT result = {:?}", result.text);
                (result.text, Some(result.provider_used))
            }
        };

        tracker.enter(NavigationStage::Extracting);
        let (intent, ai_used) = self.extract(request.ai_provider.as_deref(), &text).await?;

        tracker.enter(NavigationStage::UrlGenerating);
        let map_provider = match request.map_provider.as_deref() {
            Some(key) => key
                .parse::<MapProvider>()
                .map_err(|e| NavError::MapGeneration(Box::new(e)))?,
            None => self.default_map,
        };

        let start = intent.start.unwrap_or_else(|| CURRENT_LOCATION.to_string());
        let end = intent.end.unwrap_or_default();
        let url = map::generate(&start, &end, map_provider)
            .map_err(|e| NavError::MapGeneration(Box::new(e)))?;

        tracker.enter(NavigationStage::Succeeded);
        Ok(NavigationResponse {
            start,
            end,
            url,
            recognized_text: text,
            stt_provider: stt_used,
            ai_provider: ai_used,
            map_provider,
            confidence: intent.confidence,
        })
    }

    async fn transcribe(
        &self,
        requested: Option<&str>,
        data: &str,
        format: &str,
    ) -> Result<TranscriptionResult> {
        let audio = decode_audio(data)?;

        let key = requested.unwrap_or(self.default_stt.as_str());
        key.parse::<SttProvider>()?;
        let client = self.stt.get(key)?;

        let result = client.transcribe(&audio, format).await?;
        if result.text == STT_UNAVAILABLE_SENTINEL {
            return Err(NavError::SttUnavailable);
        }
        Ok(result)
    }

    /// LLM tier when any vendor is configured, regex tier otherwise.
    ///
    /// The returned intent has at least one endpoint.
    async fn extract(
        &self,
        requested: Option<&str>,
        text: &str,
    ) -> Result<(NavigationIntent, String)> {
        if let Some(key) = requested {
            key.parse::<AiProvider>()?;
        }

        let (intent, served_by) = if self.ai.is_empty() {
            log::debug!("pipeline: no AI provider configured, using pattern matcher");
            let intent = self.matcher.extract(text).retain_valid_locations();
            (intent, PATTERN_PROVIDER.to_string())
        } else {
            let key = requested.unwrap_or(self.default_ai.as_str());
            let client = self.ai.get(key)?;
            (client.extract_intent(text).await?, key.to_string())
        };

        if !intent.is_resolved() {
            return Err(NavError::NoLocation);
        }
        Ok((intent, served_by))
    }
}

/// Decode a base64 audio payload, dropping any `data:...;base64,` prefix.
///
/// # Errors
///
/// [`NavError::Decoding`] for invalid base64 or an empty payload.
pub fn decode_audio(data: &str) -> Result<Vec<u8>> {
    let payload = match data.split_once(',') {
        Some((header, rest)) if header.starts_with("data:") => rest,
        _ => data,
    };

    let audio = BASE64
        .decode(payload.trim())
        .map_err(|e| NavError::Decoding(e.to_string()))?;
    if audio.is_empty() {
        return Err(NavError::Decoding("audio payload is empty".into()));
    }
    Ok(audio)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
