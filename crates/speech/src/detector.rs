//! Offline synthetic-voice detector subprocess runner.
//!
//! The detector is a Python model evaluation script that scores a recording
//! in ~2.5 s chunks and prints an `AGGREGATED_RESULT:` JSON line with the
//! summary the pipeline persists. Availability is probed once at startup and
//! the result is passed into the pipeline explicitly, so tests can inject
//! either state deterministically.

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use callshield_core::voice::VoiceAnalysis;

use crate::transcribe::SpeechError;

/// Maximum stdout or stderr captured per stream (1 MiB). The detector's
/// useful output is one JSON line; anything beyond this is model chatter.
const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Prefix of the stdout line carrying the aggregated JSON summary.
const RESULT_MARKER: &str = "AGGREGATED_RESULT:";

/// Voice detector configuration.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Python interpreter to invoke (default: `python3`).
    pub python_bin: String,
    /// Path to the detector evaluation script.
    pub script_path: PathBuf,
    /// Subprocess timeout in seconds (default: `120` — model inference on
    /// CPU is slow for long recordings).
    pub timeout_secs: u64,
}

impl DetectorConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default   |
    /// |------------------------------|-----------|
    /// | `VOICE_DETECTOR_PYTHON`      | `python3` |
    /// | `VOICE_DETECTOR_SCRIPT`      | required  |
    /// | `VOICE_DETECTOR_TIMEOUT_SECS`| `120`     |
    pub fn from_env() -> Result<Self, SpeechError> {
        let python_bin =
            std::env::var("VOICE_DETECTOR_PYTHON").unwrap_or_else(|_| "python3".into());
        let script_path = std::env::var("VOICE_DETECTOR_SCRIPT")
            .map_err(|_| SpeechError::MissingConfig("VOICE_DETECTOR_SCRIPT"))?;
        let timeout_secs: u64 = std::env::var("VOICE_DETECTOR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .map_err(|_| SpeechError::MissingConfig("VOICE_DETECTOR_TIMEOUT_SECS"))?;

        Ok(Self {
            python_bin,
            script_path: PathBuf::from(script_path),
            timeout_secs,
        })
    }
}

/// The synthetic-voice screening interface the pipeline depends on.
#[async_trait::async_trait]
pub trait VoiceScreener: Send + Sync {
    /// Score raw recording bytes and return the aggregated analysis.
    async fn analyze(&self, audio: &[u8]) -> Result<VoiceAnalysis, SpeechError>;
}

/// Subprocess-backed detector running the RawNet evaluation script.
pub struct RawNetDetector {
    config: DetectorConfig,
}

impl RawNetDetector {
    /// Probe availability and return a detector handle when the script is
    /// present on disk.
    ///
    /// The caller owns the `Option`: the pipeline takes it as an explicit
    /// constructor argument rather than re-probing lazily per call.
    pub fn initialize(config: DetectorConfig) -> Option<Self> {
        if !config.script_path.is_file() {
            tracing::warn!(
                script = %config.script_path.display(),
                "Voice detector script not found; synthetic-voice screening disabled"
            );
            return None;
        }
        tracing::info!(
            script = %config.script_path.display(),
            "Voice detector available"
        );
        Some(Self { config })
    }
}

#[async_trait::async_trait]
impl VoiceScreener for RawNetDetector {
    async fn analyze(&self, audio: &[u8]) -> Result<VoiceAnalysis, SpeechError> {
        // The script takes a file path, so stage the bytes in a temp file
        // that lives until the subprocess exits.
        let mut wav = tempfile::NamedTempFile::new()
            .map_err(|e| SpeechError::Detector(format!("temp file creation failed: {e}")))?;
        wav.write_all(audio)
            .map_err(|e| SpeechError::Detector(format!("temp file write failed: {e}")))?;
        wav.flush()
            .map_err(|e| SpeechError::Detector(format!("temp file flush failed: {e}")))?;

        let mut cmd = Command::new(&self.config.python_bin);
        cmd.arg(&self.config.script_path)
            .arg(wav.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // On timeout the child is dropped and killed.
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| SpeechError::Detector(format!("spawn failed: {e}")))?;

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
        let stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(SpeechError::Detector(format!("wait failed: {e}"))),
            Err(_elapsed) => {
                return Err(SpeechError::DetectorTimeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&stdout_task.await.unwrap_or_default()).into_owned();
        if !status.success() {
            let stderr =
                String::from_utf8_lossy(&stderr_task.await.unwrap_or_default()).into_owned();
            return Err(SpeechError::Detector(format!(
                "exit code {}: {}",
                status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        parse_aggregated_result(&stdout)
    }
}

/// Extract and deserialize the `AGGREGATED_RESULT:` line from detector
/// stdout.
fn parse_aggregated_result(stdout: &str) -> Result<VoiceAnalysis, SpeechError> {
    let json = stdout
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix(RESULT_MARKER))
        .ok_or_else(|| SpeechError::Detector("no AGGREGATED_RESULT line in output".into()))?;
    serde_json::from_str(json.trim())
        .map_err(|e| SpeechError::Detector(format!("malformed aggregated result: {e}")))
}

/// Read an output stream into a byte buffer, capped at [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}
