//! Passcode attempt-tracking entity model.

use sqlx::FromRow;

use callshield_core::types::{DbId, Timestamp};

/// A row from the `passcode_attempts` table.
///
/// One row per `(profile_id, source_ip)` tracking consecutive failures;
/// a successful verification deletes the row.
#[derive(Debug, Clone, FromRow)]
pub struct PasscodeAttempt {
    pub id: DbId,
    pub profile_id: DbId,
    pub source_ip: String,
    pub failed_attempts: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PasscodeAttempt {
    /// True when the row is locked out as of `now`.
    pub fn is_locked(&self, now: Timestamp) -> bool {
        self.locked_until.map_or(false, |until| until > now)
    }
}
