//! Telephony provider configuration.

use crate::client::TelephonyError;

/// Credentials and endpoint for the telephony provider REST API.
#[derive(Debug, Clone)]
pub struct TelephonyConfig {
    /// Base API URL, e.g. `https://api.twilio.com`.
    pub api_base: String,
    /// Provider account identifier (basic-auth username).
    pub account_sid: String,
    /// Provider auth token (basic-auth password).
    pub auth_token: String,
    /// Per-request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl TelephonyConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                          | Default                  |
    /// |----------------------------------|--------------------------|
    /// | `TELEPHONY_API_BASE`             | `https://api.twilio.com` |
    /// | `TELEPHONY_ACCOUNT_SID`          | required                 |
    /// | `TELEPHONY_AUTH_TOKEN`           | required                 |
    /// | `TELEPHONY_REQUEST_TIMEOUT_SECS` | `30`                     |
    ///
    /// Missing credentials are a startup error, not a per-request one.
    pub fn from_env() -> Result<Self, TelephonyError> {
        let api_base = std::env::var("TELEPHONY_API_BASE")
            .unwrap_or_else(|_| "https://api.twilio.com".into());
        let account_sid = std::env::var("TELEPHONY_ACCOUNT_SID")
            .map_err(|_| TelephonyError::MissingConfig("TELEPHONY_ACCOUNT_SID"))?;
        let auth_token = std::env::var("TELEPHONY_AUTH_TOKEN")
            .map_err(|_| TelephonyError::MissingConfig("TELEPHONY_AUTH_TOKEN"))?;
        let request_timeout_secs: u64 = std::env::var("TELEPHONY_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .map_err(|_| TelephonyError::MissingConfig("TELEPHONY_REQUEST_TIMEOUT_SECS"))?;

        Ok(Self {
            api_base,
            account_sid,
            auth_token,
            request_timeout_secs,
        })
    }
}
