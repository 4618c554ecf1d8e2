//! Repository for the `calls` table.

use chrono::{Duration, Utc};
use sqlx::PgPool;

use callshield_core::types::DbId;

use crate::models::call::{Call, CallVerdict, NewCall};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, provider_call_sid, provider_recording_sid, profile_id, \
    from_number, to_number, caller_hash, recording_status, recording_duration_secs, \
    recording_url, storage_path, transcript, transcript_confidence, fraud_score, \
    fraud_risk_level, matched_keywords, score_notes, fraud_alert_required, \
    voice_alert_band, voice_fake_score, feedback_status, feedback_by, feedback_at, \
    created_at, updated_at";

/// Provides persistence for screened calls.
pub struct CallRepo;

impl CallRepo {
    /// Atomically create the call row for a recording, or fetch the existing
    /// one when the webhook was redelivered.
    ///
    /// The insert races against concurrent deliveries of the same notice;
    /// `uq_calls_recording_sid` guarantees exactly one row wins and everyone
    /// observes it.
    pub async fn create_or_fetch(pool: &PgPool, input: &NewCall) -> Result<Call, sqlx::Error> {
        let insert = format!(
            "INSERT INTO calls
                (provider_call_sid, provider_recording_sid, profile_id, from_number,
                 to_number, caller_hash, recording_status, recording_duration_secs,
                 recording_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT ON CONSTRAINT uq_calls_recording_sid DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Call>(&insert)
            .bind(&input.provider_call_sid)
            .bind(&input.provider_recording_sid)
            .bind(input.profile_id)
            .bind(&input.from_number)
            .bind(&input.to_number)
            .bind(&input.caller_hash)
            .bind(&input.recording_status)
            .bind(input.recording_duration_secs)
            .bind(&input.recording_url)
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(call) => Ok(call),
            // Lost the insert race (or plain redelivery): the winning row
            // must exist because call rows are never deleted.
            None => {
                let query =
                    format!("SELECT {COLUMNS} FROM calls WHERE provider_recording_sid = $1");
                sqlx::query_as::<_, Call>(&query)
                    .bind(&input.provider_recording_sid)
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// Find a call by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Call>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM calls WHERE id = $1");
        sqlx::query_as::<_, Call>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record where the recording bytes landed in object storage.
    pub async fn set_recording_stored(
        pool: &PgPool,
        id: DbId,
        storage_path: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE calls SET storage_path = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(storage_path)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach the transcription result, scored or not.
    pub async fn set_transcript(
        pool: &PgPool,
        id: DbId,
        transcript: Option<&str>,
        confidence: Option<f32>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE calls
             SET transcript = $2, transcript_confidence = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(transcript)
        .bind(confidence)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the fraud verdict for a scored call.
    pub async fn record_verdict(
        pool: &PgPool,
        id: DbId,
        verdict: &CallVerdict,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE calls
             SET fraud_score = $2,
                 fraud_risk_level = $3,
                 matched_keywords = $4,
                 score_notes = $5,
                 fraud_alert_required = $6,
                 voice_alert_band = $7,
                 voice_fake_score = $8,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(verdict.fraud_score)
        .bind(&verdict.fraud_risk_level)
        .bind(&verdict.matched_keywords)
        .bind(&verdict.score_notes)
        .bind(verdict.fraud_alert_required)
        .bind(&verdict.voice_alert_band)
        .bind(verdict.voice_fake_score)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count prior calls from the same caller to the same profile within the
    /// trailing window, excluding the call currently being scored.
    ///
    /// Feeds the repeat-caller boost.
    pub async fn count_recent_by_caller(
        pool: &PgPool,
        profile_id: DbId,
        caller_hash: &str,
        window_days: i64,
        exclude_call_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let cutoff = Utc::now() - Duration::days(window_days);
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM calls
             WHERE profile_id = $1
               AND caller_hash = $2
               AND created_at >= $3
               AND id != $4",
        )
        .bind(profile_id)
        .bind(caller_hash)
        .bind(cutoff)
        .bind(exclude_call_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Record caretaker feedback on a call and return the updated row.
    pub async fn record_feedback(
        pool: &PgPool,
        id: DbId,
        status: &str,
        user_id: DbId,
    ) -> Result<Option<Call>, sqlx::Error> {
        let query = format!(
            "UPDATE calls
             SET feedback_status = $2, feedback_by = $3, feedback_at = NOW(), updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Call>(&query)
            .bind(id)
            .bind(status)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
