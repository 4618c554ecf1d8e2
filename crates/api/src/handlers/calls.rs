//! Handlers for the `/calls` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use callshield_core::automation::FeedbackStatus;
use callshield_core::error::CoreError;
use callshield_core::storage::resolve_signed_url_ttl;
use callshield_core::types::DbId;
use callshield_db::models::call::Call;
use callshield_db::repositories::{CallRepo, ProfileRepo};
use callshield_pipeline::AutomationActuator;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/calls/{id}
///
/// Return the full call row: verdict, matched keywords and the scoring
/// audit notes, for review UIs.
pub async fn get_call(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Call>> {
    let call = CallRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Call", id })?;
    Ok(Json(call))
}

/// Request body for the feedback endpoint.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    /// One of `marked_safe`, `marked_fraud`, `reviewed`, `archived`.
    pub status: String,
    /// The caretaker recording the feedback.
    pub user_id: DbId,
}

/// POST /api/v1/calls/{id}/feedback
///
/// Record caretaker feedback on a call, then resolve its alerts and run
/// list automation. The feedback write is the authoritative part; the
/// follow-on effects are best-effort and never fail the request.
pub async fn record_feedback(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<FeedbackRequest>,
) -> AppResult<Json<Call>> {
    let feedback = FeedbackStatus::from_str_db(&body.status)?;

    let call = CallRepo::record_feedback(&state.pool, id, feedback.as_str(), body.user_id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Call", id })?;

    if let Some(profile_id) = call.profile_id {
        match ProfileRepo::find_by_id(&state.pool, profile_id).await {
            Ok(Some(profile)) => {
                AutomationActuator::on_feedback(&state.pool, &profile, &call, feedback).await;
            }
            Ok(None) => {
                tracing::warn!(call_id = id, profile_id, "Feedback on a call with no profile");
            }
            Err(e) => {
                tracing::error!(call_id = id, error = %e, "Profile lookup for automation failed");
            }
        }
    }

    Ok(Json(call))
}

/// Query parameters for the recording URL endpoint.
#[derive(Debug, Deserialize)]
pub struct RecordingUrlQuery {
    /// Requested URL lifetime in seconds (default 300, capped at 3600).
    pub expires_in: Option<u64>,
}

/// Signed recording URL response payload.
#[derive(Debug, Serialize)]
pub struct RecordingUrlResponse {
    pub url: String,
    pub expires_in_secs: u64,
}

/// GET /api/v1/calls/{id}/recording-url
///
/// Generate a time-limited GET URL for a stored recording. 404 until the
/// intake pipeline has persisted the recording bytes.
pub async fn recording_url(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<RecordingUrlQuery>,
) -> AppResult<Json<RecordingUrlResponse>> {
    let expires_in_secs = resolve_signed_url_ttl(params.expires_in)?;

    let call = CallRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Call", id })?;
    let Some(storage_path) = call.storage_path else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Recording",
            id,
        }));
    };
    let url = state
        .storage
        .signed_get_url(&storage_path, expires_in_secs)
        .await
        .map_err(|e| AppError::InternalError(format!("Signed URL generation failed: {e}")))?;

    Ok(Json(RecordingUrlResponse {
        url,
        expires_in_secs,
    }))
}
