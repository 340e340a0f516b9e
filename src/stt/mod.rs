//! Speech-to-text clients.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   SttClient (trait)                      │
//! │                                                          │
//! │  OpenAiSttClient   AliyunSttClient   LocalSttClient      │
//! │  (multipart)       (base64 JSON)     whisper-cli         │
//! │        │                 │            → vosk-transcriber  │
//! │        └──────┬──────────┘            → whisper           │
//! │               ▼                       → sentinel text     │
//! │        AutoSttClient ── on error, once ──▶ LocalSttClient │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_nav::stt::{LocalSttClient, SttClient, STT_UNAVAILABLE_SENTINEL};
//!
//! # async fn run(wav: Vec<u8>) -> voice_nav::error::Result<()> {
//! let client = LocalSttClient::new(None, "zh");
//! let result = client.transcribe(&wav, "wav").await?;
//! if result.text == STT_UNAVAILABLE_SENTINEL {
//!     println!("no local engine installed");
//! }
//! # Ok(())
//! # }
//! ```

pub mod aliyun;
pub mod auto;
pub mod client;
pub mod local;
pub mod openai;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use aliyun::AliyunSttClient;
pub use auto::AutoSttClient;
pub use client::{SttClient, SttProvider, TranscriptionResult};
pub use local::{EngineOutput, LocalEngine, LocalSttClient, STT_UNAVAILABLE_SENTINEL};
pub use openai::OpenAiSttClient;
