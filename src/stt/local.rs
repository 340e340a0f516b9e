//! Locally installed speech recognition engines.
//!
//! [`LocalSttClient`] walks an ordered list of [`LocalEngine`]s and returns
//! the first transcript produced by an engine that is on `PATH`, exits
//! successfully and prints something.  When every engine is missing or
//! fails, it returns [`STT_UNAVAILABLE_SENTINEL`] as a successful result;
//! the orchestrator turns that text into a user-facing error.
//!
//! The audio and every engine output live in one `tempfile::TempDir`, which
//! is removed when `transcribe` returns or its future is dropped.  Engine
//! processes are spawned with `kill_on_drop(true)`, so a request deadline
//! terminates a running engine.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{NavError, Result};
use crate::stt::client::{SttClient, SttProvider, TranscriptionResult};

/// Text returned when no local engine could transcribe the audio.
pub const STT_UNAVAILABLE_SENTINEL: &str = "[语音识别失败，请使用文字输入]";

/// Where whisper.cpp models are looked up when no path is configured.
pub const DEFAULT_MODEL_DIR: &str = "/usr/local/share/whisper/models";

const PROVIDER_NAME: &str = "Local STT (whisper.cpp/vosk/whisper)";

// ---------------------------------------------------------------------------
// LocalEngine
// ---------------------------------------------------------------------------

/// Where an engine leaves its transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutput {
    /// Standard output of the process.
    Stdout,
    /// A file with this name inside the working directory.
    File(String),
}

/// One external transcription program and how to invoke it.
///
/// Arguments may contain placeholders that are substituted per call:
/// `{audio}` (audio file path), `{dir}` (working directory), `{model_dir}`,
/// `{lang}` (configured language) and `{locale}` (language with region,
/// e.g. `zh-cn`).
#[derive(Debug, Clone)]
pub struct LocalEngine {
    pub program: String,
    pub args: Vec<String>,
    pub output: EngineOutput,
}

impl LocalEngine {
    pub fn new(program: &str, args: &[&str], output: EngineOutput) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            output,
        }
    }

    /// whisper.cpp, fast native engine.
    pub fn whisper_cpp() -> Self {
        Self::new(
            "whisper-cli",
            &[
                "-m", "{model_dir}/ggml-base.bin",
                "-l", "{lang}",
                "-otxt",
                "-of", "{dir}/transcript",
                "-f", "{audio}",
            ],
            EngineOutput::File("transcript.txt".into()),
        )
    }

    /// Vosk command line transcriber.
    pub fn vosk() -> Self {
        Self::new(
            "vosk-transcriber",
            &["-i", "{audio}", "-l", "{locale}"],
            EngineOutput::Stdout,
        )
    }

    /// openai-whisper Python CLI, the slowest option.
    pub fn whisper_python() -> Self {
        Self::new(
            "whisper",
            &[
                "{audio}",
                "--model", "base",
                "--language", "{lang}",
                "--output_format", "txt",
                "--output_dir", "{dir}",
            ],
            EngineOutput::File("audio.txt".into()),
        )
    }

    /// Probe order used in production.
    pub fn default_chain() -> Vec<LocalEngine> {
        vec![Self::whisper_cpp(), Self::vosk(), Self::whisper_python()]
    }
}

/// Values substituted into engine arguments for one call.
struct Invocation<'a> {
    audio: &'a Path,
    dir: &'a Path,
    model_dir: &'a str,
    lang: &'a str,
}

impl Invocation<'_> {
    fn expand(&self, arg: &str) -> String {
        arg.replace("{audio}", &self.audio.to_string_lossy())
            .replace("{dir}", &self.dir.to_string_lossy())
            .replace("{model_dir}", self.model_dir)
            .replace("{locale}", &locale_for(self.lang))
            .replace("{lang}", self.lang)
    }
}

fn locale_for(lang: &str) -> String {
    match lang {
        "zh" => "zh-cn".to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// LocalSttClient
// ---------------------------------------------------------------------------

/// Runs the first working local engine.
pub struct LocalSttClient {
    engines: Vec<LocalEngine>,
    model_dir: String,
    language: String,
}

impl LocalSttClient {
    /// Production engine chain.  `model_dir` defaults to [`DEFAULT_MODEL_DIR`].
    pub fn new(model_dir: Option<&str>, language: &str) -> Self {
        Self::with_engines(LocalEngine::default_chain(), model_dir, language)
    }

    /// Custom engine chain, probed in the given order.
    pub fn with_engines(
        engines: Vec<LocalEngine>,
        model_dir: Option<&str>,
        language: &str,
    ) -> Self {
        let model_dir = model_dir
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_MODEL_DIR)
            .trim_end_matches('/')
            .to_string();

        Self {
            engines,
            model_dir,
            language: language.to_string(),
        }
    }

    async fn run_engine(
        &self,
        engine: &LocalEngine,
        invocation: &Invocation<'_>,
    ) -> Result<String> {
        let program: PathBuf = which::which(&engine.program)
            .map_err(|_| NavError::ProviderNotAvailable(engine.program.clone()))?;

        let args: Vec<String> = engine.args.iter().map(|a| invocation.expand(a)).collect();
        log::debug!("stt: running {} {}", program.display(), args.join(" "));

        let output = Command::new(&program)
            .args(&args)
            .current_dir(invocation.dir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(NavError::Upstream {
                provider: engine.program.clone(),
                status: None,
                body: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let text = match &engine.output {
            EngineOutput::Stdout => String::from_utf8_lossy(&output.stdout).into_owned(),
            EngineOutput::File(name) => tokio::fs::read_to_string(invocation.dir.join(name)).await?,
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(NavError::EmptyResponse(engine.program.clone()));
        }
        Ok(text.to_string())
    }

    fn result(&self, text: String) -> TranscriptionResult {
        TranscriptionResult {
            text,
            language: self.language.clone(),
            provider_used: SttProvider::Local,
        }
    }
}

/// Keep the audio file extension to plain alphanumerics.
fn file_extension(format: &str) -> String {
    let ext: String = format.chars().filter(char::is_ascii_alphanumeric).collect();
    if ext.is_empty() {
        "wav".to_string()
    } else {
        ext.to_ascii_lowercase()
    }
}

#[async_trait]
impl SttClient for LocalSttClient {
    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<TranscriptionResult> {
        let work_dir = tempfile::Builder::new().prefix("voice-nav-").tempdir()?;
        let audio_path = work_dir.path().join(format!("audio.{}", file_extension(format)));
        tokio::fs::write(&audio_path, audio).await?;

        let invocation = Invocation {
            audio: &audio_path,
            dir: work_dir.path(),
            model_dir: &self.model_dir,
            lang: &self.language,
        };

        for engine in &self.engines {
            match self.run_engine(engine, &invocation).await {
                Ok(text) => {
                    log::info!("stt: transcribed with local engine {}", engine.program);
                    return Ok(self.result(text));
                }
                Err(NavError::ProviderNotAvailable(program)) => {
                    log::debug!("stt: local engine {program} not installed");
                }
                Err(e) => log::warn!("stt: local engine {} failed: {e}", engine.program),
            }
        }

        log::warn!("stt: no local engine could transcribe the audio");
        Ok(self.result(STT_UNAVAILABLE_SENTINEL.to_string()))
    }

    fn provider_name(&self) -> String {
        PROVIDER_NAME.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_order() {
        let programs: Vec<String> = LocalEngine::default_chain()
            .into_iter()
            .map(|e| e.program)
            .collect();
        assert_eq!(programs, ["whisper-cli", "vosk-transcriber", "whisper"]);
    }

    #[test]
    fn placeholders_are_expanded() {
        let inv = Invocation {
            audio: Path::new("/tmp/x/audio.wav"),
            dir: Path::new("/tmp/x"),
            model_dir: "/models",
            lang: "zh",
        };
        assert_eq!(inv.expand("{model_dir}/ggml-base.bin"), "/models/ggml-base.bin");
        assert_eq!(inv.expand("{dir}/transcript"), "/tmp/x/transcript");
        assert_eq!(inv.expand("{locale}"), "zh-cn");
        assert_eq!(inv.expand("{lang}"), "zh");
        assert_eq!(inv.expand("{audio}"), "/tmp/x/audio.wav");
    }

    #[test]
    fn model_dir_defaults_and_trims() {
        let c = LocalSttClient::new(None, "zh");
        assert_eq!(c.model_dir, DEFAULT_MODEL_DIR);
        let c = LocalSttClient::new(Some("/opt/models/"), "zh");
        assert_eq!(c.model_dir, "/opt/models");
    }

    #[test]
    fn extension_is_sanitised() {
        assert_eq!(file_extension("webm"), "webm");
        assert_eq!(file_extension("../WAV"), "wav");
        assert_eq!(file_extension(""), "wav");
    }

    #[tokio::test]
    async fn missing_engines_yield_sentinel() {
        let client = LocalSttClient::with_engines(
            vec![LocalEngine::new(
                "voice-nav-test-engine-that-does-not-exist",
                &["{audio}"],
                EngineOutput::Stdout,
            )],
            None,
            "zh",
        );
        let result = client.transcribe(b"RIFF", "wav").await.unwrap();
        assert_eq!(result.text, STT_UNAVAILABLE_SENTINEL);
        assert_eq!(result.provider_used, SttProvider::Local);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn first_successful_engine_wins_and_audio_is_removed() {
        let client = LocalSttClient::with_engines(
            vec![
                LocalEngine::new("false", &[], EngineOutput::Stdout),
                LocalEngine::new("echo", &["{audio}"], EngineOutput::Stdout),
            ],
            None,
            "zh",
        );
        let result = client.transcribe(b"RIFF", "wav").await.unwrap();

        // echo prints the temporary audio path, which must be gone afterwards.
        assert!(result.text.ends_with("audio.wav"), "got {}", result.text);
        assert!(!Path::new(&result.text).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn transcript_file_is_read_from_work_dir() {
        let client = LocalSttClient::with_engines(
            vec![LocalEngine::new(
                "sh",
                &["-c", "printf '去西湖\\n' > {dir}/transcript.txt"],
                EngineOutput::File("transcript.txt".into()),
            )],
            None,
            "zh",
        );
        let result = client.transcribe(b"RIFF", "wav").await.unwrap();
        assert_eq!(result.text, "去西湖");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn empty_output_counts_as_failure() {
        let client = LocalSttClient::with_engines(
            vec![LocalEngine::new("true", &[], EngineOutput::Stdout)],
            None,
            "zh",
        );
        let result = client.transcribe(b"RIFF", "wav").await.unwrap();
        assert_eq!(result.text, STT_UNAVAILABLE_SENTINEL);
    }

    /// Engine that records its work dir in `marker`, then runs `tail`.
    #[cfg(unix)]
    fn recording_engine(marker: &Path, tail: &str) -> LocalEngine {
        let script = format!("echo {{dir}} > {}; {tail}", marker.display());
        LocalEngine::new("sh", &["-c", &script], EngineOutput::Stdout)
    }

    #[cfg(unix)]
    fn recorded_dir(marker: &Path) -> PathBuf {
        let recorded = std::fs::read_to_string(marker).unwrap();
        PathBuf::from(recorded.trim())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_engine_still_removes_audio() {
        let scratch = tempfile::tempdir().unwrap();
        let marker = scratch.path().join("dir.txt");
        let client = LocalSttClient::with_engines(
            vec![recording_engine(&marker, "exit 3")],
            None,
            "zh",
        );

        let result = client.transcribe(b"RIFF", "wav").await.unwrap();
        assert_eq!(result.text, STT_UNAVAILABLE_SENTINEL);

        let work_dir = recorded_dir(&marker);
        assert!(work_dir.starts_with(std::env::temp_dir()), "got {}", work_dir.display());
        assert!(!work_dir.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn deadline_drops_engine_and_removes_audio() {
        let scratch = tempfile::tempdir().unwrap();
        let marker = scratch.path().join("dir.txt");
        let client = LocalSttClient::with_engines(
            vec![recording_engine(&marker, "exec sleep 30")],
            None,
            "zh",
        );

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(500),
            client.transcribe(b"RIFF", "wav"),
        )
        .await;
        assert!(outcome.is_err(), "engine should still be running at the deadline");

        let work_dir = recorded_dir(&marker);
        assert!(!work_dir.exists());
    }
}
