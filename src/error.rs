//! Error taxonomy shared by every stage of the navigation pipeline.
//!
//! [`NavError`] is returned by the STT clients, the intent extractors, the
//! map URL generator and the registry builders.  The orchestrator wraps it in
//! a [`PipelineError`](crate::pipeline::PipelineError) that also records the
//! stage that failed.

use std::time::Duration;

use thiserror::Error;

/// Convenience alias used across the library.
pub type Result<T> = std::result::Result<T, NavError>;

// ---------------------------------------------------------------------------
// NavError
// ---------------------------------------------------------------------------

/// Every failure the navigation core can report.
#[derive(Debug, Error)]
pub enum NavError {
    /// A client could not be constructed (e.g. missing credential).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Bad caller input, e.g. an empty route endpoint.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The provider name does not match any known provider.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The provider is known but was not configured in the registry.
    #[error("provider {0} is not available")]
    ProviderNotAvailable(String),

    /// A vendor answered with a non-success status or business code.
    ///
    /// `status` is `None` when the request never produced an HTTP response
    /// (connection refused, DNS failure, ...).
    #[error("{provider} upstream error (status {}): {body}", status_label(.status))]
    Upstream {
        provider: String,
        status: Option<u16>,
        body: String,
    },

    /// A vendor answered successfully but without any usable result.
    #[error("{0} returned an empty result")]
    EmptyResponse(String),

    /// The intent payload is not the agreed `{"start", "end"}` JSON object.
    #[error("failed to parse navigation intent ({reason}), raw content: {content}")]
    IntentParse { reason: String, content: String },

    /// The audio payload could not be decoded.
    #[error("failed to decode audio payload: {0}")]
    Decoding(String),

    /// Every speech recognition path is exhausted.
    #[error("speech recognition is unavailable, please type the route instead")]
    SttUnavailable,

    /// Neither a start nor an end could be resolved from the text.
    #[error("could not recognise a start or a destination")]
    NoLocation,

    /// The request deadline elapsed before the pipeline finished.
    #[error("navigation timed out after {0:?}")]
    Timeout(Duration),

    /// URL generation rejected the resolved route.
    #[error("failed to generate map URL: {0}")]
    MapGeneration(#[source] Box<NavError>),

    /// Transient file handling for local engines failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

impl NavError {
    /// Stable machine-readable code for front ends.
    pub fn kind(&self) -> &'static str {
        match self {
            NavError::Configuration(_) => "configuration",
            NavError::Validation(_) => "validation",
            NavError::UnsupportedProvider(_) => "unsupported_provider",
            NavError::ProviderNotAvailable(_) => "provider_not_available",
            NavError::Upstream { .. } => "upstream",
            NavError::EmptyResponse(_) => "empty_response",
            NavError::IntentParse { .. } => "intent_parse",
            NavError::Decoding(_) => "decoding",
            NavError::SttUnavailable => "stt_unavailable",
            NavError::NoLocation => "no_location",
            NavError::Timeout(_) => "timeout",
            NavError::MapGeneration(_) => "map_generation",
            NavError::Io(_) => "io",
        }
    }

    /// Build an [`NavError::Upstream`] for a transport-level `reqwest` failure.
    ///
    /// The request deadline belongs to the orchestrator, so a timeout raised
    /// by the HTTP client itself is reported as an upstream failure.
    pub(crate) fn transport(provider: &str, err: reqwest::Error) -> Self {
        transport_failure(provider, err.is_timeout(), err.to_string())
    }
}

fn transport_failure(provider: &str, timed_out: bool, detail: String) -> NavError {
    let body = if timed_out {
        format!("request timed out: {detail}")
    } else {
        detail
    };
    NavError::Upstream {
        provider: provider.to_string(),
        status: None,
        body,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
