//! Repository for the `profiles` table.

use sqlx::PgPool;

use callshield_core::types::{DbId, Timestamp};

use crate::models::profile::Profile;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, display_name, virtual_number, alert_threshold, notify_push, \
    notify_sms, auto_mark_enabled, auto_block_on_fraud, auto_trust_on_safe, safe_phrases, \
    passcode_hash, passcode_pepper_version, passcode_locked_until, created_at, updated_at";

/// Provides read and passcode-state operations for protected profiles.
///
/// Profile CRUD itself lives outside the screening pipeline; this repo only
/// covers what intake, automation and the passcode guard need.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Find a profile by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the profile owning a provider virtual number.
    ///
    /// This is how a webhook notice is routed: the `To` number of the call
    /// is the profile's virtual number.
    pub async fn find_by_virtual_number(
        pool: &PgPool,
        virtual_number: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE virtual_number = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(virtual_number)
            .fetch_optional(pool)
            .await
    }

    /// Store a freshly hashed passcode and the pepper version it was
    /// hashed under.
    pub async fn set_passcode(
        pool: &PgPool,
        id: DbId,
        passcode_hash: &str,
        pepper_version: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE profiles
             SET passcode_hash = $2, passcode_pepper_version = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(passcode_hash)
        .bind(pepper_version)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mirror the lockout deadline onto the profile row.
    ///
    /// Pass `None` to clear the mirror after a successful verification.
    pub async fn set_locked_until(
        pool: &PgPool,
        id: DbId,
        locked_until: Option<Timestamp>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE profiles SET passcode_locked_until = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(locked_until)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
