//! HTTP client for the telephony provider REST API.

use std::time::Duration;

use serde::Deserialize;

use crate::config::TelephonyConfig;

/// Errors from the telephony provider layer.
#[derive(Debug, thiserror::Error)]
pub enum TelephonyError {
    /// A required environment variable is missing or malformed.
    #[error("Missing or invalid telephony configuration: {0}")]
    MissingConfig(&'static str),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Telephony API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Call metadata from the provider's call resource.
///
/// Used to fill in fields a webhook delivery omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallMetadata {
    /// Caller number in the provider's E.164 formatting.
    pub from: Option<String>,
    /// Receiving (virtual) number.
    pub to: Option<String>,
    /// Provider-side call status, e.g. `completed`.
    pub status: Option<String>,
    /// Call duration in seconds, as the provider reports it (a string).
    pub duration: Option<String>,
}

/// The narrow provider interface the intake pipeline depends on.
///
/// Trait-shaped so tests can substitute a stub without a network.
#[async_trait::async_trait]
pub trait RecordingProvider: Send + Sync {
    /// Fetch call metadata by provider call sid.
    async fn lookup_call(&self, call_sid: &str) -> Result<CallMetadata, TelephonyError>;

    /// Download the raw recording bytes from a provider recording URL.
    async fn download_recording(&self, recording_url: &str) -> Result<Vec<u8>, TelephonyError>;
}

/// HTTP client for a single provider account.
pub struct TelephonyClient {
    client: reqwest::Client,
    config: TelephonyConfig,
}

impl TelephonyClient {
    /// Create a client with a bounded per-request timeout.
    pub fn new(config: TelephonyConfig) -> Result<Self, TelephonyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Ensure the response has a success status code, or capture the body
    /// into an [`TelephonyError::ApiError`].
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, TelephonyError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TelephonyError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl RecordingProvider for TelephonyClient {
    async fn lookup_call(&self, call_sid: &str) -> Result<CallMetadata, TelephonyError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls/{}.json",
            self.config.api_base, self.config.account_sid, call_sid
        );
        let response = self
            .client
            .get(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<CallMetadata>().await?)
    }

    async fn download_recording(&self, recording_url: &str) -> Result<Vec<u8>, TelephonyError> {
        let response = self
            .client
            .get(recording_url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
