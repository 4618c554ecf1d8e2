//! Repository for the `blocked_callers` table.

use sqlx::PgPool;

use callshield_core::types::DbId;

use crate::models::caller_list::BlockedCaller;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, profile_id, caller_hash, reason, created_at, updated_at";

/// Provides persistence for per-profile blocked callers.
pub struct BlockedCallerRepo;

impl BlockedCallerRepo {
    /// Upsert a block entry for a caller.
    ///
    /// Re-blocking an already-blocked caller refreshes the reason, so a
    /// human-feedback block overrides an earlier score-driven one.
    pub async fn upsert(
        pool: &PgPool,
        profile_id: DbId,
        caller_hash: &str,
        reason: &str,
    ) -> Result<BlockedCaller, sqlx::Error> {
        let query = format!(
            "INSERT INTO blocked_callers (profile_id, caller_hash, reason)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_blocked_callers_profile_caller
                DO UPDATE SET reason = EXCLUDED.reason, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BlockedCaller>(&query)
            .bind(profile_id)
            .bind(caller_hash)
            .bind(reason)
            .fetch_one(pool)
            .await
    }

    /// Remove a block entry. Returns `true` when an entry existed.
    pub async fn remove(
        pool: &PgPool,
        profile_id: DbId,
        caller_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM blocked_callers WHERE profile_id = $1 AND caller_hash = $2")
                .bind(profile_id)
                .bind(caller_hash)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find the block entry for a caller, if any.
    pub async fn find(
        pool: &PgPool,
        profile_id: DbId,
        caller_hash: &str,
    ) -> Result<Option<BlockedCaller>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM blocked_callers WHERE profile_id = $1 AND caller_hash = $2");
        sqlx::query_as::<_, BlockedCaller>(&query)
            .bind(profile_id)
            .bind(caller_hash)
            .fetch_optional(pool)
            .await
    }
}
