//! Blocked-caller and trusted-contact entity models.

use serde::Serialize;
use sqlx::FromRow;

use callshield_core::types::{DbId, Timestamp};

/// A row from the `blocked_callers` table.
///
/// Keyed by `(profile_id, caller_hash)`; a caller is never simultaneously
/// blocked and trusted, the actuator removes the opposing entry first.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlockedCaller {
    pub id: DbId,
    pub profile_id: DbId,
    pub caller_hash: String,
    /// One of `auto_fraud_score`, `feedback_fraud`, `manual`.
    pub reason: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `trusted_contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrustedContact {
    pub id: DbId,
    pub profile_id: DbId,
    pub caller_hash: String,
    pub label: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Blocked/trusted standing of one caller against one profile.
#[derive(Debug, Clone, Serialize)]
pub struct CallerStatus {
    pub caller_hash: String,
    pub blocked: bool,
    pub block_reason: Option<String>,
    pub trusted: bool,
    pub trusted_label: Option<String>,
}
