//! Speech-to-text service client.

use std::time::Duration;

use serde::Deserialize;

/// Errors from the speech collaborators.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// A required environment variable is missing or malformed.
    #[error("Missing or invalid speech configuration: {0}")]
    MissingConfig(&'static str),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Speech API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The detector subprocess failed or produced unusable output.
    #[error("Voice detector failed: {0}")]
    Detector(String),

    /// The detector subprocess exceeded its timeout.
    #[error("Voice detector timed out after {elapsed_ms} ms")]
    DetectorTimeout { elapsed_ms: u64 },
}

/// Speech-to-text service configuration.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Transcription endpoint URL.
    pub api_url: String,
    /// Bearer token for the transcription service.
    pub api_key: String,
    /// Per-request timeout in seconds (default: `60` — transcription of a
    /// long voicemail is slow).
    pub request_timeout_secs: u64,
}

impl SpeechConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                       | Default  |
    /// |-------------------------------|----------|
    /// | `SPEECH_API_URL`              | required |
    /// | `SPEECH_API_KEY`              | required |
    /// | `SPEECH_REQUEST_TIMEOUT_SECS` | `60`     |
    pub fn from_env() -> Result<Self, SpeechError> {
        let api_url = std::env::var("SPEECH_API_URL")
            .map_err(|_| SpeechError::MissingConfig("SPEECH_API_URL"))?;
        let api_key = std::env::var("SPEECH_API_KEY")
            .map_err(|_| SpeechError::MissingConfig("SPEECH_API_KEY"))?;
        let request_timeout_secs: u64 = std::env::var("SPEECH_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .map_err(|_| SpeechError::MissingConfig("SPEECH_REQUEST_TIMEOUT_SECS"))?;

        Ok(Self {
            api_url,
            api_key,
            request_timeout_secs,
        })
    }
}

/// A best-effort transcription result.
#[derive(Debug, Clone, Deserialize)]
pub struct Transcription {
    /// Recognized text.
    pub transcript: String,
    /// Service confidence in `[0, 1]`, when reported.
    pub confidence: Option<f32>,
}

/// The narrow speech-to-text interface the intake pipeline depends on.
///
/// `Ok(None)` means the service had nothing confident to say (silence, a
/// hangup, unintelligible audio) — a valid terminal state, not an error.
#[async_trait::async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe raw audio bytes.
    async fn transcribe(&self, audio: &[u8]) -> Result<Option<Transcription>, SpeechError>;
}

/// HTTP client for the speech-to-text service.
pub struct TranscriptionClient {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl TranscriptionClient {
    /// Create a client with a bounded per-request timeout.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl SpeechToText for TranscriptionClient {
    async fn transcribe(&self, audio: &[u8]) -> Result<Option<Transcription>, SpeechError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(audio.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SpeechError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let result = response.json::<Transcription>().await?;
        if result.transcript.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(result))
    }
}
