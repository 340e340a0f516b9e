//! Command-line entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging (`RUST_LOG`, default `info`).
//! 2. Load [`AppConfig`] from `--config` or the platform settings file.
//! 3. Build the provider registries and the [`NavigationOrchestrator`].
//! 4. Run one navigation and print the response (or failure) as JSON.
//!
//! Exit code is 0 on success, 1 when the navigation failed and 2 on bad
//! usage or configuration.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::Parser;
use serde_json::json;

use voice_nav::{
    config::AppConfig,
    pipeline::{NavigationOrchestrator, NavigationRequest},
};

/// Turn a spoken or typed route request into a map navigation URL.
#[derive(Parser, Debug)]
#[command(name = "voice-nav")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn a spoken or typed route request into a map navigation URL")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(short, long, env = "VOICE_NAV_CONFIG")]
    config: Option<PathBuf>,

    /// AI provider key: chatgpt, claude or deepseek
    #[arg(long)]
    ai: Option<String>,

    /// Map provider key: baidu, amap or google
    #[arg(long)]
    map: Option<String>,

    /// STT provider key for --audio: auto, openai, aliyun or local
    #[arg(long)]
    stt: Option<String>,

    /// Audio file to transcribe instead of text
    #[arg(long, conflicts_with = "text")]
    audio: Option<PathBuf>,

    /// Print the configured providers and exit
    #[arg(long)]
    providers: bool,

    /// Route request, e.g. "从长泰广场去七牛云"
    text: Vec<String>,
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => AppConfig::load().context("failed to load config"),
    }
}

fn build_request(cli: &Cli) -> Result<NavigationRequest> {
    let mut request = match &cli.audio {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read audio file {}", path.display()))?;
            let format = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("wav")
                .to_string();
            NavigationRequest::audio(BASE64.encode(bytes), format)
        }
        None => {
            let text = cli.text.join(" ");
            if text.trim().is_empty() {
                bail!("nothing to navigate: pass a route as text or --audio FILE");
            }
            NavigationRequest::text(text)
        }
    };

    request.ai_provider = cli.ai.clone();
    request.map_provider = cli.map.clone();
    request.stt_provider = cli.stt.clone();
    Ok(request)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let orchestrator = NavigationOrchestrator::from_config(&config);

    if cli.providers {
        let report = json!({
            "ai": orchestrator.available_ai_providers(),
            "stt": orchestrator.stt_provider_names(),
        });
        println!("{report:#}");
        return ExitCode::SUCCESS;
    }

    let request = match build_request(&cli) {
        Ok(request) => request,
        Err(e) => {
            log::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    match orchestrator.navigate(request).await {
        Ok(response) => {
            println!("{:#}", json!({ "success": true, "data": response }));
            ExitCode::SUCCESS
        }
        Err(e) => {
            let failure = json!({
                "success": false,
                "stage": e.stage,
                "kind": e.kind(),
                "message": e.message(),
            });
            println!("{failure:#}");
            ExitCode::FAILURE
        }
    }
}
