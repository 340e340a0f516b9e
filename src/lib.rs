//! Voice or text to navigation URL.
//!
//! An utterance is transcribed ([`stt`]), turned into a start/end pair
//! ([`llm`] or the regex tier in [`intent`]) and rendered as a map link
//! ([`map`]).  [`pipeline::NavigationOrchestrator`] chains the stages under
//! one deadline using the read-only provider sets from [`registry`].

pub mod config;
pub mod error;
pub mod intent;
pub mod llm;
pub mod map;
pub mod pipeline;
pub mod registry;
pub mod stt;
