//! Recording intake orchestrator.
//!
//! One invocation per webhook delivery: resolve routing, create-or-fetch the
//! call row, download and store the recording, transcribe, score, persist
//! the verdict, raise alerts, run automation. The chain is sequential and
//! never retries in-process; provider redelivery is the retry mechanism, and
//! the unique recording sid plus the has-verdict short-circuit make
//! redelivery safe.

use std::sync::Arc;

use callshield_core::lexicon::{FraudLexicon, DEFAULT_ALERT_THRESHOLD, REPEAT_CALLER_WINDOW_DAYS};
use callshield_core::phone::{caller_hash, canonicalize_number};
use callshield_core::scorer::{self, RiskLevel, ScoreOutcome};
use callshield_core::storage::recording_object_key;
use callshield_core::types::DbId;
use callshield_core::voice::VoiceAlertBand;
use callshield_cloud::{StorageError, StorageProvider};
use callshield_db::models::alert::NewAlert;
use callshield_db::models::call::{Call, CallVerdict, NewCall};
use callshield_db::models::profile::Profile;
use callshield_db::repositories::{AlertRepo, CallRepo, ProfileRepo};
use callshield_db::DbPool;
use callshield_speech::{SpeechToText, VoiceScreener};
use callshield_telephony::{RecordingProvider, TelephonyError};

use callshield_core::alert::AlertType;

use crate::automation::AutomationActuator;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The recording-ready notice as delivered by the provider webhook.
///
/// Every field is optional: providers omit fields across delivery variants,
/// and what is missing gets filled by a synchronous metadata lookup where
/// the pipeline needs it.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotice {
    pub call_sid: Option<String>,
    pub recording_sid: Option<String>,
    pub recording_url: Option<String>,
    pub recording_status: Option<String>,
    pub recording_duration_secs: Option<i32>,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
}

/// Scoring knobs the orchestrator applies around the pure scorer.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Fallback alert threshold for profiles without their own.
    pub default_alert_threshold: i32,
    /// Caller-history window for the repeat-caller boost, in days.
    pub repeat_caller_window_days: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_alert_threshold: DEFAULT_ALERT_THRESHOLD,
            repeat_caller_window_days: REPEAT_CALLER_WINDOW_DAYS as i64,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes and errors
// ---------------------------------------------------------------------------

/// What one intake invocation did, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    /// The notice could not be routed to a managed profile, or lacked the
    /// data to process at all. Silently discarded by design.
    Ignored { reason: &'static str },
    /// The call row already carries a verdict; redelivery, nothing to do.
    Duplicate { call_id: DbId },
    /// Recording stored, but transcription produced nothing usable. A valid
    /// terminal state (silence, hangup) — no score.
    NoTranscript { call_id: DbId },
    /// The full pipeline ran and a verdict was persisted.
    Scored {
        call_id: DbId,
        score: i32,
        level: RiskLevel,
        alert_required: bool,
        alert_raised: bool,
    },
}

/// Errors that abort an intake invocation.
///
/// The call row, if already created, stays valid for a later redelivery.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Telephony provider error: {0}")]
    Telephony(#[from] TelephonyError),

    #[error("Recording storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// The webhook-driven pipeline controller.
///
/// Collaborators are injected as trait objects; the voice detector is an
/// `Option` carrying the explicit availability result from startup.
pub struct RecordingIntake {
    pool: DbPool,
    provider: Arc<dyn RecordingProvider>,
    storage: Arc<dyn StorageProvider>,
    speech: Arc<dyn SpeechToText>,
    detector: Option<Arc<dyn VoiceScreener>>,
    lexicon: FraudLexicon,
    config: ScoringConfig,
}

impl RecordingIntake {
    pub fn new(
        pool: DbPool,
        provider: Arc<dyn RecordingProvider>,
        storage: Arc<dyn StorageProvider>,
        speech: Arc<dyn SpeechToText>,
        detector: Option<Arc<dyn VoiceScreener>>,
        lexicon: FraudLexicon,
        config: ScoringConfig,
    ) -> Self {
        Self {
            pool,
            provider,
            storage,
            speech,
            detector,
            lexicon,
            config,
        }
    }

    /// Process one recording-ready notice end to end.
    pub async fn handle_recording_ready(
        &self,
        mut notice: RecordingNotice,
    ) -> Result<IntakeOutcome, IntakeError> {
        let Some(call_sid) = notice.call_sid.clone() else {
            return Ok(IntakeOutcome::Ignored {
                reason: "missing provider call sid",
            });
        };

        // Fill absent routing fields from the provider before giving up on
        // the notice. A lookup failure is not fatal; the notice may still
        // carry everything we need.
        if notice.from_number.is_none() || notice.to_number.is_none() {
            match self.provider.lookup_call(&call_sid).await {
                Ok(meta) => {
                    notice.from_number = notice.from_number.or(meta.from);
                    notice.to_number = notice.to_number.or(meta.to);
                    if notice.recording_duration_secs.is_none() {
                        notice.recording_duration_secs =
                            meta.duration.and_then(|d| d.parse().ok());
                    }
                }
                Err(e) => {
                    tracing::warn!(call_sid, error = %e, "Call metadata lookup failed");
                }
            }
        }

        // Step 1: resolve routing. Calls to numbers we don't manage are not
        // an error, they are simply not ours.
        let Some(to_number) = notice.to_number.clone() else {
            return Ok(IntakeOutcome::Ignored {
                reason: "missing destination number",
            });
        };
        let Some(profile) = ProfileRepo::find_by_virtual_number(
            &self.pool,
            &canonicalize_number(&to_number),
        )
        .await?
        else {
            return Ok(IntakeOutcome::Ignored {
                reason: "no profile for destination number",
            });
        };

        // Step 2: create-or-fetch, keyed by recording sid with the call sid
        // as fallback key.
        let recording_sid = notice
            .recording_sid
            .clone()
            .unwrap_or_else(|| call_sid.clone());
        let hash = notice.from_number.as_deref().map(caller_hash);
        let call = CallRepo::create_or_fetch(
            &self.pool,
            &NewCall {
                provider_call_sid: call_sid.clone(),
                provider_recording_sid: recording_sid,
                profile_id: Some(profile.id),
                from_number: notice.from_number.clone(),
                to_number: Some(to_number),
                caller_hash: hash.clone(),
                recording_status: notice.recording_status.clone(),
                recording_duration_secs: notice.recording_duration_secs,
                recording_url: notice.recording_url.clone(),
            },
        )
        .await?;

        if call.has_verdict() {
            tracing::info!(call_id = call.id, "Redelivered notice for a scored call");
            return Ok(IntakeOutcome::Duplicate { call_id: call.id });
        }

        // Step 3: download. A transport failure aborts this invocation; the
        // row stays as-is so redelivery can retry.
        let Some(recording_url) = notice.recording_url.or(call.recording_url.clone()) else {
            return Ok(IntakeOutcome::Ignored {
                reason: "missing recording url",
            });
        };
        let audio = self.provider.download_recording(&recording_url).await?;

        // Step 4: persist bytes at the deterministic key.
        let object_key = recording_object_key(profile.id, call.id);
        self.storage.put_recording(&object_key, audio.clone()).await?;
        CallRepo::set_recording_stored(&self.pool, call.id, &object_key).await?;

        // Step 5: transcribe. Nothing usable is a valid terminal state.
        let transcription = match self.speech.transcribe(&audio).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(call_id = call.id, error = %e, "Transcription failed");
                None
            }
        };
        let Some(transcription) = transcription else {
            return Ok(IntakeOutcome::NoTranscript { call_id: call.id });
        };
        CallRepo::set_transcript(
            &self.pool,
            call.id,
            Some(&transcription.transcript),
            transcription.confidence,
        )
        .await?;

        // Step 6: score, with history and safe-phrase adjustments.
        let mut outcome = scorer::score_transcript(&transcription.transcript, &self.lexicon);
        let prior_calls = match &hash {
            Some(h) => CallRepo::count_recent_by_caller(
                &self.pool,
                profile.id,
                h,
                self.config.repeat_caller_window_days,
                call.id,
            )
            .await? as u32,
            None => 0,
        };
        let safe_matches =
            scorer::match_safe_phrases(&transcription.transcript, &profile.safe_phrases);
        scorer::apply_adjustments(&mut outcome, prior_calls, safe_matches);

        // Synthetic-voice screening, when the detector came up at startup.
        let voice = match &self.detector {
            Some(screener) => match screener.analyze(&audio).await {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    tracing::warn!(call_id = call.id, error = %e, "Voice detector failed");
                    None
                }
            },
            None => None,
        };
        outcome.notes.voice_analysis = voice.clone();

        // Step 7: persist the verdict.
        let threshold = profile
            .alert_threshold
            .unwrap_or(self.config.default_alert_threshold);
        let alert_required = outcome.score >= threshold;
        let verdict = CallVerdict {
            fraud_score: outcome.score,
            fraud_risk_level: outcome.level.as_str().to_string(),
            matched_keywords: outcome.matched_keywords.clone(),
            score_notes: serde_json::to_value(&outcome.notes)
                .unwrap_or(serde_json::Value::Null),
            fraud_alert_required: alert_required,
            voice_alert_band: voice.as_ref().map(|v| v.alert_band.as_str().to_string()),
            voice_fake_score: voice.as_ref().map(|v| v.binary_average_fake as f32),
        };
        CallRepo::record_verdict(&self.pool, call.id, &verdict).await?;

        tracing::info!(
            call_id = call.id,
            profile_id = profile.id,
            score = outcome.score,
            level = outcome.level.as_str(),
            alert_required,
            "Call scored"
        );

        // Step 8: alerts and automation, gated on channels. Failures from
        // here on are logged; the verdict is already durable.
        let mut alert_raised = false;
        if profile.any_channel_enabled() {
            if alert_required {
                alert_raised = self.raise_alert(&profile, &call, &outcome, AlertType::Fraud).await;
                if let Some(h) = &hash {
                    AutomationActuator::on_verdict(&self.pool, &profile, h).await;
                }
            }
            if voice.as_ref().map(|v| v.alert_band) == Some(VoiceAlertBand::High) {
                self.raise_alert(&profile, &call, &outcome, AlertType::SyntheticVoice)
                    .await;
            }
        }

        Ok(IntakeOutcome::Scored {
            call_id: call.id,
            score: outcome.score,
            level: outcome.level,
            alert_required,
            alert_raised,
        })
    }

    /// Upsert an alert row (ignore-duplicate). Returns whether a new alert
    /// was actually created.
    async fn raise_alert(
        &self,
        profile: &Profile,
        call: &Call,
        outcome: &ScoreOutcome,
        alert_type: AlertType,
    ) -> bool {
        let input = NewAlert {
            call_id: call.id,
            profile_id: profile.id,
            alert_type,
            fraud_score: Some(outcome.score),
            risk_level: Some(outcome.level.as_str().to_string()),
            matched_keywords: outcome.matched_keywords.clone(),
        };
        match AlertRepo::raise(&self.pool, &input).await {
            Ok(Some(alert_id)) => {
                tracing::info!(
                    call_id = call.id,
                    alert_id,
                    alert_type = alert_type.as_str(),
                    "Alert raised"
                );
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::error!(call_id = call.id, error = %e, "Alert upsert failed");
                false
            }
        }
    }
}
