//! Call entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use callshield_core::types::{DbId, Timestamp};

/// A row from the `calls` table.
///
/// A call row is created at webhook time and enriched in place as the
/// intake pipeline progresses: recording stored, transcript attached,
/// verdict recorded. Rows are never deleted by the pipeline.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Call {
    pub id: DbId,
    pub provider_call_sid: String,
    /// Idempotence key: webhook redeliveries collapse onto this value.
    pub provider_recording_sid: String,
    pub profile_id: Option<DbId>,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
    /// SHA-256 of the canonicalized caller number; raw numbers are never
    /// used as list keys.
    pub caller_hash: Option<String>,
    pub recording_status: Option<String>,
    pub recording_duration_secs: Option<i32>,
    pub recording_url: Option<String>,
    pub storage_path: Option<String>,
    pub transcript: Option<String>,
    pub transcript_confidence: Option<f32>,
    pub fraud_score: Option<i32>,
    pub fraud_risk_level: Option<String>,
    pub matched_keywords: Vec<String>,
    /// Full scoring audit record, serialized `ScoreNotes`.
    pub score_notes: Option<serde_json::Value>,
    pub fraud_alert_required: bool,
    pub voice_alert_band: Option<String>,
    pub voice_fake_score: Option<f32>,
    pub feedback_status: Option<String>,
    pub feedback_by: Option<DbId>,
    pub feedback_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Call {
    /// True once a fraud verdict has been recorded for this call.
    ///
    /// Webhook redeliveries short-circuit on this so automation and alerts
    /// never double-fire for the same recording.
    pub fn has_verdict(&self) -> bool {
        self.fraud_score.is_some()
    }
}

/// DTO for inserting a new call row at webhook time.
#[derive(Debug, Clone)]
pub struct NewCall {
    pub provider_call_sid: String,
    pub provider_recording_sid: String,
    pub profile_id: Option<DbId>,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
    pub caller_hash: Option<String>,
    pub recording_status: Option<String>,
    pub recording_duration_secs: Option<i32>,
    pub recording_url: Option<String>,
}

/// Scoring verdict written back once transcription and scoring finish.
#[derive(Debug, Clone)]
pub struct CallVerdict {
    pub fraud_score: i32,
    pub fraud_risk_level: String,
    pub matched_keywords: Vec<String>,
    pub score_notes: serde_json::Value,
    pub fraud_alert_required: bool,
    pub voice_alert_band: Option<String>,
    pub voice_fake_score: Option<f32>,
}
