//! Repository for the `call_alerts` table.

use sqlx::PgPool;

use callshield_core::alert::AlertType;
use callshield_core::types::DbId;

use crate::models::alert::{CallAlert, NewAlert};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, call_id, profile_id, alert_type, status, fraud_score, \
    risk_level, matched_keywords, created_at, updated_at, resolved_at";

/// Provides persistence for caretaker-facing call alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Raise an alert for a call, returning the new alert id.
    ///
    /// Ignore-duplicate semantics: at most one alert exists per
    /// `(call_id, alert_type)`, so re-raising from a redelivered webhook
    /// is a silent no-op and returns `None`.
    pub async fn raise(pool: &PgPool, input: &NewAlert) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO call_alerts
                (call_id, profile_id, alert_type, fraud_score, risk_level, matched_keywords)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT ON CONSTRAINT uq_call_alerts_call_type DO NOTHING
             RETURNING id",
        )
        .bind(input.call_id)
        .bind(input.profile_id)
        .bind(input.alert_type.as_str())
        .bind(input.fraud_score)
        .bind(&input.risk_level)
        .bind(&input.matched_keywords)
        .fetch_optional(pool)
        .await
    }

    /// List all alerts for a call, newest first.
    pub async fn list_for_call(pool: &PgPool, call_id: DbId) -> Result<Vec<CallAlert>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM call_alerts WHERE call_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, CallAlert>(&query)
            .bind(call_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve every open alert on a call.
    ///
    /// Returns the number of alerts transitioned to `resolved`.
    pub async fn resolve_for_call(pool: &PgPool, call_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE call_alerts
             SET status = 'resolved', resolved_at = NOW(), updated_at = NOW()
             WHERE call_id = $1 AND status != 'resolved'",
        )
        .bind(call_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Retag the fraud/safe alert on a call to match recorded feedback.
    ///
    /// Only the verdict alert flips type; a `synthetic_voice` alert keeps
    /// its type when resolved.
    pub async fn retag_for_call(
        pool: &PgPool,
        call_id: DbId,
        new_type: AlertType,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE call_alerts
             SET alert_type = $2, updated_at = NOW()
             WHERE call_id = $1 AND alert_type IN ('fraud', 'safe') AND alert_type != $2",
        )
        .bind(call_id)
        .bind(new_type.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
