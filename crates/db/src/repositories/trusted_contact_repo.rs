//! Repository for the `trusted_contacts` table.

use sqlx::PgPool;

use callshield_core::types::DbId;

use crate::models::caller_list::TrustedContact;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, profile_id, caller_hash, label, created_at, updated_at";

/// Provides persistence for per-profile trusted contacts.
pub struct TrustedContactRepo;

impl TrustedContactRepo {
    /// Upsert a trusted-contact entry for a caller.
    ///
    /// An existing entry keeps its label unless a new one is supplied.
    pub async fn upsert(
        pool: &PgPool,
        profile_id: DbId,
        caller_hash: &str,
        label: Option<&str>,
    ) -> Result<TrustedContact, sqlx::Error> {
        let query = format!(
            "INSERT INTO trusted_contacts (profile_id, caller_hash, label)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_trusted_contacts_profile_caller
                DO UPDATE SET label = COALESCE(EXCLUDED.label, trusted_contacts.label),
                              updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TrustedContact>(&query)
            .bind(profile_id)
            .bind(caller_hash)
            .bind(label)
            .fetch_one(pool)
            .await
    }

    /// Remove a trusted-contact entry. Returns `true` when an entry existed.
    pub async fn remove(
        pool: &PgPool,
        profile_id: DbId,
        caller_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM trusted_contacts WHERE profile_id = $1 AND caller_hash = $2")
                .bind(profile_id)
                .bind(caller_hash)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find the trusted-contact entry for a caller, if any.
    pub async fn find(
        pool: &PgPool,
        profile_id: DbId,
        caller_hash: &str,
    ) -> Result<Option<TrustedContact>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM trusted_contacts WHERE profile_id = $1 AND caller_hash = $2");
        sqlx::query_as::<_, TrustedContact>(&query)
            .bind(profile_id)
            .bind(caller_hash)
            .fetch_optional(pool)
            .await
    }
}
