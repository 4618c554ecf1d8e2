//! Handler for caller block/trust standing lookups.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use callshield_core::phone::caller_hash;
use callshield_core::types::DbId;
use callshield_db::models::caller_list::CallerStatus;
use callshield_db::repositories::{BlockedCallerRepo, TrustedContactRepo};

use crate::error::AppResult;
use crate::state::AppState;

/// Query parameters for the caller status endpoint.
#[derive(Debug, Deserialize)]
pub struct CallerStatusQuery {
    pub profile_id: DbId,
    /// Caller number in any formatting; canonicalized before hashing.
    pub number: String,
}

/// GET /api/v1/callers/status?profile_id=&number=
///
/// Report a caller's standing against one profile. The raw number never
/// reaches the database; lookups go through the caller hash.
pub async fn caller_status(
    State(state): State<AppState>,
    Query(params): Query<CallerStatusQuery>,
) -> AppResult<Json<CallerStatus>> {
    let hash = caller_hash(&params.number);

    let blocked = BlockedCallerRepo::find(&state.pool, params.profile_id, &hash).await?;
    let trusted = TrustedContactRepo::find(&state.pool, params.profile_id, &hash).await?;

    Ok(Json(CallerStatus {
        caller_hash: hash,
        blocked: blocked.is_some(),
        block_reason: blocked.map(|b| b.reason),
        trusted: trusted.is_some(),
        trusted_label: trusted.and_then(|t| t.label),
    }))
}
