//! Repository for the `passcode_attempts` table.

use sqlx::PgPool;

use callshield_core::types::{DbId, Timestamp};

use crate::models::passcode::PasscodeAttempt;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, profile_id, source_ip, failed_attempts, locked_until, created_at, updated_at";

/// Provides failure tracking for the passcode lockout guard.
pub struct PasscodeAttemptRepo;

impl PasscodeAttemptRepo {
    /// Find the attempt row for a `(profile, source IP)` pair.
    pub async fn find(
        pool: &PgPool,
        profile_id: DbId,
        source_ip: &str,
    ) -> Result<Option<PasscodeAttempt>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM passcode_attempts WHERE profile_id = $1 AND source_ip = $2");
        sqlx::query_as::<_, PasscodeAttempt>(&query)
            .bind(profile_id)
            .bind(source_ip)
            .fetch_optional(pool)
            .await
    }

    /// Record one more consecutive failure and return the updated row.
    ///
    /// Upserts so the first failure from a new pair creates the row; the
    /// returned `failed_attempts` count feeds the lockout schedule.
    pub async fn record_failure(
        pool: &PgPool,
        profile_id: DbId,
        source_ip: &str,
    ) -> Result<PasscodeAttempt, sqlx::Error> {
        let query = format!(
            "INSERT INTO passcode_attempts (profile_id, source_ip, failed_attempts)
             VALUES ($1, $2, 1)
             ON CONFLICT ON CONSTRAINT uq_passcode_attempts_profile_ip
                DO UPDATE SET failed_attempts = passcode_attempts.failed_attempts + 1,
                              updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasscodeAttempt>(&query)
            .bind(profile_id)
            .bind(source_ip)
            .fetch_one(pool)
            .await
    }

    /// Set (or clear) the lockout deadline on an attempt row.
    pub async fn set_locked_until(
        pool: &PgPool,
        id: DbId,
        locked_until: Option<Timestamp>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE passcode_attempts SET locked_until = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(locked_until)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear all failure state for a pair after a successful verification.
    ///
    /// Returns `true` when a row existed to clear.
    pub async fn clear(
        pool: &PgPool,
        profile_id: DbId,
        source_ip: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM passcode_attempts WHERE profile_id = $1 AND source_ip = $2")
                .bind(profile_id)
                .bind(source_ip)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
