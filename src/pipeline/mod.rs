//! Request orchestration.
//!
//! This module chains the STT, intent and map stages into one
//! deadline-bounded request and reports a single outcome.
//!
//! # Architecture
//!
//! ```text
//! NavigationRequest
//!        │
//!        ▼
//! NavigationOrchestrator::navigate()   ← tokio::time::timeout
//!        │
//!        ├─ SttRegistry  (Arc, read-only)  → TranscriptionResult
//!        ├─ AiRegistry   (Arc, read-only)  → NavigationIntent
//!        │     └─ empty → IntentPatternMatcher
//!        └─ map::generate                  → URL
//!        │
//!        ▼
//! Result<NavigationResponse, PipelineError{stage, error}>
//! ```

pub mod request;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use request::{NavigationInput, NavigationRequest, NavigationResponse};
pub use runner::{decode_audio, NavigationOrchestrator, PipelineError, PATTERN_PROVIDER};
pub use state::{NavigationStage, StageTracker};
