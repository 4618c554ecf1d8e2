//! Handler for the provider recording-status webhook.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use serde::Deserialize;

use callshield_pipeline::{IntakeOutcome, RecordingNotice};

use crate::state::AppState;

/// The provider's form-encoded recording-status payload.
///
/// Field names follow the provider's PascalCase convention. Every field is
/// optional; the intake pipeline fills gaps via a metadata lookup.
#[derive(Debug, Deserialize)]
pub struct RecordingStatusPayload {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "RecordingSid")]
    pub recording_sid: Option<String>,
    #[serde(rename = "RecordingUrl")]
    pub recording_url: Option<String>,
    #[serde(rename = "RecordingStatus")]
    pub recording_status: Option<String>,
    /// Duration in seconds; the provider sends it as a string.
    #[serde(rename = "RecordingDuration")]
    pub recording_duration: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "To")]
    pub to: Option<String>,
}

impl From<RecordingStatusPayload> for RecordingNotice {
    fn from(p: RecordingStatusPayload) -> Self {
        RecordingNotice {
            call_sid: p.call_sid,
            recording_sid: p.recording_sid,
            recording_url: p.recording_url,
            recording_status: p.recording_status,
            recording_duration_secs: p.recording_duration.and_then(|d| d.parse().ok()),
            from_number: p.from,
            to_number: p.to,
        }
    }
}

/// POST /api/v1/webhooks/recording-status
///
/// Always acknowledges with `200 OK` and an empty body: the provider treats
/// anything else as a delivery failure and retries, and redelivery is
/// exactly how transient pipeline failures get retried. That covers the
/// extractor too: an unparseable payload is logged and acknowledged, not
/// bounced with a 4xx. Outcomes and errors are logged, never surfaced.
pub async fn recording_status(
    State(state): State<AppState>,
    payload: Result<Form<RecordingStatusPayload>, FormRejection>,
) -> StatusCode {
    let Form(payload) = match payload {
        Ok(form) => form,
        Err(rejection) => {
            tracing::info!(reason = %rejection, "Unreadable webhook payload ignored");
            return StatusCode::OK;
        }
    };
    match state.intake.handle_recording_ready(payload.into()).await {
        Ok(IntakeOutcome::Ignored { reason }) => {
            tracing::info!(reason, "Webhook notice ignored");
        }
        Ok(outcome) => {
            tracing::debug!(?outcome, "Webhook notice processed");
        }
        Err(e) => {
            tracing::error!(error = %e, "Recording intake failed; awaiting redelivery");
        }
    }
    StatusCode::OK
}
