//! LLM-backed navigation intent extraction.
//!
//! This module provides:
//! * [`AiIntentClient`]: async trait implemented by every vendor client.
//! * [`ChatCompletionClient`]: OpenAI-compatible chat completions (ChatGPT, DeepSeek).
//! * [`ClaudeClient`]: Anthropic messages API.
//! * [`create_ai_client`]: builds the client for an [`AiProvider`].
//! * [`parse_intent`] / [`strip_code_fence`]: shared answer post-processing.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_nav::config::AppConfig;
//! use voice_nav::intent::format_intent;
//! use voice_nav::llm::{create_ai_client, AiIntentClient, AiProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let provider = AiProvider::DeepSeek;
//!     let client = create_ai_client(provider, config.ai.provider(provider))
//!         .expect("deepseek api key configured");
//!
//!     let intent = client.extract_intent("从北京到上海").await.unwrap();
//!     println!("{}", format_intent(&intent));
//! }
//! ```

pub mod chat;
pub mod claude;
pub mod client;
pub mod prompt;
pub mod response;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use chat::ChatCompletionClient;
pub use claude::ClaudeClient;
pub use client::{create_ai_client, AiIntentClient, AiProvider};
pub use prompt::{build_messages, INTENT_SYSTEM_PROMPT};
pub use response::{parse_intent, strip_code_fence};
