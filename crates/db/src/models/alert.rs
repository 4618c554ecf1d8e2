//! Call alert entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use callshield_core::alert::AlertType;
use callshield_core::types::{DbId, Timestamp};

/// A row from the `call_alerts` table.
///
/// At most one row per `(call_id, alert_type)`; raising an alert that
/// already exists is a silent no-op.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CallAlert {
    pub id: DbId,
    pub call_id: DbId,
    pub profile_id: DbId,
    /// One of `fraud`, `safe`, `synthetic_voice`.
    pub alert_type: String,
    /// One of `pending`, `acknowledged`, `resolved`.
    pub status: String,
    /// Snapshot of the verdict at raise time, kept even if the call row
    /// is later re-scored.
    pub fraud_score: Option<i32>,
    pub risk_level: Option<String>,
    pub matched_keywords: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

/// DTO for raising a new alert.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub call_id: DbId,
    pub profile_id: DbId,
    pub alert_type: AlertType,
    pub fraud_score: Option<i32>,
    pub risk_level: Option<String>,
    pub matched_keywords: Vec<String>,
}
